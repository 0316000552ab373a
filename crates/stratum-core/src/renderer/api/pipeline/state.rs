// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! State descriptors for the pipeline.

use super::enums::*;
use crate::stratum_bitflags;
use serde::{Deserialize, Serialize};

/// Describes a single vertex attribute within a vertex buffer layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexAttribute {
    /// The input location of this attribute in the vertex shader (e.g., `layout(location = 0)`).
    pub shader_location: u32,
    /// The format of the attribute's data.
    pub format: VertexFormat,
    /// The byte offset of this attribute from the start of the vertex.
    pub offset: u64,
}

/// Describes the memory layout of the vertex buffer bound to one binding slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexBufferLayout {
    /// The binding slot this layout describes.
    pub binding: u32,
    /// The byte distance between consecutive elements in the buffer.
    pub array_stride: u64,
    /// How often the vertex buffer is advanced.
    pub step_mode: VertexStepMode,
    /// The attributes contained within each element of the buffer.
    pub attributes: Vec<VertexAttribute>,
}

impl VertexBufferLayout {
    /// The stride the backend must use. A declared stride of zero means the
    /// attributes are tightly packed, so the stride is the end of the last one.
    pub fn effective_stride(&self) -> u64 {
        if self.array_stride != 0 {
            return self.array_stride;
        }
        self.attributes
            .iter()
            .map(|a| a.offset + a.format.size())
            .max()
            .unwrap_or(0)
    }
}

/// Describes the state for primitive assembly and rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PrimitiveState {
    /// The topology of the primitives.
    pub topology: PrimitiveTopology,
    /// The vertex winding order that determines the "front" face of a triangle.
    pub front_face: FrontFace,
    /// The face culling mode.
    pub cull_mode: CullMode,
}

/// Describes depth testing. A pipeline without one has the depth test disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepthState {
    /// The comparison function used for the depth test.
    pub compare: CompareFunction,
    /// If `true`, depth values will be written to the depth buffer.
    pub write_enabled: bool,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            compare: CompareFunction::Less,
            write_enabled: true,
        }
    }
}

/// Describes a complete blend equation for the color or alpha channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendComponent {
    /// The blend factor for the source color (from the fragment shader).
    pub src_factor: BlendFactor,
    /// The blend factor for the destination color (already in the framebuffer).
    pub dst_factor: BlendFactor,
    /// The operation to combine the source and destination factors.
    pub operation: BlendOperation,
}

impl BlendComponent {
    /// The equation a context starts with: `src * 1 + dst * 0`.
    pub const REPLACE: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::Zero,
        operation: BlendOperation::Add,
    };
}

/// Describes blending for the color target. A pipeline without one has blending disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendState {
    /// The blend equation for the RGB color components.
    pub color: BlendComponent,
    /// The blend equation for the Alpha component.
    pub alpha: BlendComponent,
}

impl BlendState {
    /// Standard "over" alpha blending.
    pub const ALPHA_BLENDING: Self = Self {
        color: BlendComponent {
            src_factor: BlendFactor::SrcAlpha,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
            operation: BlendOperation::Add,
        },
        alpha: BlendComponent {
            src_factor: BlendFactor::One,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
            operation: BlendOperation::Add,
        },
    };
}

stratum_bitflags! {
    /// A bitmask to enable or disable writes to individual color channels.
    pub struct ColorWrites: u8 {
        /// Enable writes to the Red channel.
        const R = 0b0001;
        /// Enable writes to the Green channel.
        const G = 0b0010;
        /// Enable writes to the Blue channel.
        const B = 0b0100;
        /// Enable writes to the Alpha channel.
        const A = 0b1000;
        /// Enable writes to all channels.
        const ALL = Self::R.bits() | Self::G.bits() | Self::B.bits() | Self::A.bits();
    }
}

/// The fixed-function portion of a pipeline.
///
/// Its [`Default`] is the state a freshly created context is in; the backends
/// only ever touch the parts of a pipeline that differ from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedFunctionState {
    /// Primitive assembly and rasterization.
    pub primitive: PrimitiveState,
    /// Depth testing, disabled when `None`.
    pub depth: Option<DepthState>,
    /// Blending, disabled when `None`.
    pub blend: Option<BlendState>,
    /// Color channel write mask.
    pub color_writes: ColorWrites,
}

impl Default for FixedFunctionState {
    fn default() -> Self {
        Self {
            primitive: PrimitiveState::default(),
            depth: None,
            blend: None,
            color_writes: ColorWrites::ALL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_stride_of_packed_layout() {
        let layout = VertexBufferLayout {
            binding: 0,
            array_stride: 0,
            step_mode: VertexStepMode::Vertex,
            attributes: vec![
                VertexAttribute {
                    shader_location: 0,
                    format: VertexFormat::Float32x3,
                    offset: 0,
                },
                VertexAttribute {
                    shader_location: 1,
                    format: VertexFormat::Float32x2,
                    offset: 12,
                },
            ],
        };
        assert_eq!(layout.effective_stride(), 20);

        let explicit = VertexBufferLayout {
            array_stride: 32,
            ..layout
        };
        assert_eq!(explicit.effective_stride(), 32);
    }

    #[test]
    fn test_default_fixed_function_matches_fresh_context() {
        let state = FixedFunctionState::default();
        assert_eq!(state.depth, None);
        assert_eq!(state.blend, None);
        assert_eq!(state.primitive.cull_mode, CullMode::None);
        assert_eq!(state.primitive.front_face, FrontFace::Ccw);
        assert_eq!(state.color_writes, ColorWrites::ALL);
    }
}
