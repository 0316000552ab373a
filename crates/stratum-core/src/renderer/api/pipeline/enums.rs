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

//! Enums for pipeline configuration.

use serde::{Deserialize, Serialize};

/// The memory format of a single vertex attribute's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexFormat {
    /// Four 8-bit unsigned integer components.
    Uint8x4,
    /// Four 8-bit unsigned integer components normalized to `[0.0, 1.0]`.
    Unorm8x4,
    /// Two 16-bit signed integer components normalized to `[-1.0, 1.0]`.
    Snorm16x2,
    /// Four 16-bit signed integer components normalized to `[-1.0, 1.0]`.
    Snorm16x4,
    /// Two 16-bit float components.
    Float16x2,
    /// Four 16-bit float components.
    Float16x4,
    /// One 32-bit float component.
    Float32,
    /// Two 32-bit float components.
    Float32x2,
    /// Three 32-bit float components.
    Float32x3,
    /// Four 32-bit float components.
    Float32x4,
    /// One 32-bit unsigned integer component.
    Uint32,
    /// Two 32-bit unsigned integer components.
    Uint32x2,
    /// Three 32-bit unsigned integer components.
    Uint32x3,
    /// Four 32-bit unsigned integer components.
    Uint32x4,
    /// One 32-bit signed integer component.
    Sint32,
    /// Two 32-bit signed integer components.
    Sint32x2,
    /// Three 32-bit signed integer components.
    Sint32x3,
    /// Four 32-bit signed integer components.
    Sint32x4,
}

/// The scalar type a vertex format is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexScalar {
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit signed integer.
    I16,
    /// 16-bit float.
    F16,
    /// 32-bit float.
    F32,
    /// 32-bit unsigned integer.
    U32,
    /// 32-bit signed integer.
    I32,
}

impl VertexFormat {
    /// Returns the size in bytes of this vertex format.
    pub const fn size(self) -> u64 {
        self.component_count() as u64 * self.scalar_size()
    }

    /// Returns the number of components (1 to 4).
    pub const fn component_count(self) -> u32 {
        match self {
            VertexFormat::Float32 | VertexFormat::Uint32 | VertexFormat::Sint32 => 1,
            VertexFormat::Snorm16x2
            | VertexFormat::Float16x2
            | VertexFormat::Float32x2
            | VertexFormat::Uint32x2
            | VertexFormat::Sint32x2 => 2,
            VertexFormat::Float32x3 | VertexFormat::Uint32x3 | VertexFormat::Sint32x3 => 3,
            VertexFormat::Uint8x4
            | VertexFormat::Unorm8x4
            | VertexFormat::Snorm16x4
            | VertexFormat::Float16x4
            | VertexFormat::Float32x4
            | VertexFormat::Uint32x4
            | VertexFormat::Sint32x4 => 4,
        }
    }

    /// Returns the scalar type of each component.
    pub const fn scalar(self) -> VertexScalar {
        match self {
            VertexFormat::Uint8x4 | VertexFormat::Unorm8x4 => VertexScalar::U8,
            VertexFormat::Snorm16x2 | VertexFormat::Snorm16x4 => VertexScalar::I16,
            VertexFormat::Float16x2 | VertexFormat::Float16x4 => VertexScalar::F16,
            VertexFormat::Float32
            | VertexFormat::Float32x2
            | VertexFormat::Float32x3
            | VertexFormat::Float32x4 => VertexScalar::F32,
            VertexFormat::Uint32
            | VertexFormat::Uint32x2
            | VertexFormat::Uint32x3
            | VertexFormat::Uint32x4 => VertexScalar::U32,
            VertexFormat::Sint32
            | VertexFormat::Sint32x2
            | VertexFormat::Sint32x3
            | VertexFormat::Sint32x4 => VertexScalar::I32,
        }
    }

    const fn scalar_size(self) -> u64 {
        match self.scalar() {
            VertexScalar::U8 => 1,
            VertexScalar::I16 | VertexScalar::F16 => 2,
            VertexScalar::F32 | VertexScalar::U32 | VertexScalar::I32 => 4,
        }
    }

    /// Returns `true` if the shader reads the attribute as integers rather than floats.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            VertexFormat::Uint8x4
                | VertexFormat::Uint32
                | VertexFormat::Uint32x2
                | VertexFormat::Uint32x3
                | VertexFormat::Uint32x4
                | VertexFormat::Sint32
                | VertexFormat::Sint32x2
                | VertexFormat::Sint32x3
                | VertexFormat::Sint32x4
        )
    }

    /// Returns `true` if integer data is normalized into a float range.
    pub const fn is_normalized(self) -> bool {
        matches!(
            self,
            VertexFormat::Unorm8x4 | VertexFormat::Snorm16x2 | VertexFormat::Snorm16x4
        )
    }
}

/// Defines how often the GPU advances to the next element in a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VertexStepMode {
    /// The GPU advances to the next element for each vertex.
    #[default]
    Vertex,
    /// The GPU advances to the next element only for each new instance being rendered.
    Instance,
}

/// Defines how vertices are connected to form a geometric primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrimitiveTopology {
    /// Vertices are rendered as a list of isolated points.
    PointList,
    /// Vertices are rendered as a list of isolated lines (every two vertices form a line).
    LineList,
    /// Vertices are rendered as a connected line strip.
    LineStrip,
    /// Vertices are rendered as a list of isolated triangles.
    #[default]
    TriangleList,
    /// Vertices are rendered as a connected triangle strip.
    TriangleStrip,
}

/// Defines which face of a triangle to cull (not render).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CullMode {
    /// No culling is performed.
    #[default]
    None,
    /// Cull front-facing triangles.
    Front,
    /// Cull back-facing triangles.
    Back,
}

/// Defines which vertex winding order considers a triangle to be "front-facing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FrontFace {
    /// Counter-clockwise winding order is the front face (OpenGL default).
    #[default]
    Ccw,
    /// Clockwise winding order is the front face.
    Cw,
}

/// The comparison function used for depth testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompareFunction {
    /// The test never passes.
    Never,
    /// The test passes if the new value is less than the existing value.
    #[default]
    Less,
    /// The test passes if the new value is equal to the existing value.
    Equal,
    /// The test passes if the new value is less than or equal to the existing value.
    LessEqual,
    /// The test passes if the new value is greater than the existing value.
    Greater,
    /// The test passes if the new value is not equal to the existing value.
    NotEqual,
    /// The test passes if the new value is greater than or equal to the existing value.
    GreaterEqual,
    /// The test always passes.
    Always,
}

/// A factor in a blend equation, determining how much a source or destination color contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendFactor {
    /// The factor is `0.0`.
    Zero,
    /// The factor is `1.0`.
    One,
    /// The factor is the source color.
    SrcColor,
    /// The factor is `1.0 - src`.
    OneMinusSrcColor,
    /// The factor is the source alpha component (`src.a`).
    SrcAlpha,
    /// The factor is `1.0 - src.a`.
    OneMinusSrcAlpha,
    /// The factor is the destination color.
    DstColor,
    /// The factor is `1.0 - dst`.
    OneMinusDstColor,
    /// The factor is the destination alpha component (`dst.a`).
    DstAlpha,
    /// The factor is `1.0 - dst.a`.
    OneMinusDstAlpha,
}

/// The operation used to combine source and destination colors in a blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendOperation {
    /// The result is `source + destination`.
    #[default]
    Add,
    /// The result is `source - destination`.
    Subtract,
    /// The result is `destination - source`.
    ReverseSubtract,
    /// The result is `min(source, destination)`.
    Min,
    /// The result is `max(source, destination)`.
    Max,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_format_sizes() {
        assert_eq!(VertexFormat::Float32x3.size(), 12);
        assert_eq!(VertexFormat::Unorm8x4.size(), 4);
        assert_eq!(VertexFormat::Snorm16x2.size(), 4);
        assert_eq!(VertexFormat::Float16x4.size(), 8);
        assert_eq!(VertexFormat::Sint32x4.size(), 16);
    }

    #[test]
    fn test_vertex_format_interpretation() {
        assert!(VertexFormat::Uint32x2.is_integer());
        assert!(!VertexFormat::Unorm8x4.is_integer());
        assert!(VertexFormat::Unorm8x4.is_normalized());
        assert!(!VertexFormat::Float32.is_normalized());
    }
}
