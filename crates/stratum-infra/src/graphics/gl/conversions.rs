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

use stratum_core::renderer::api::buffer::BufferKind;
use stratum_core::renderer::api::pipeline::enums::{
    BlendFactor, BlendOperation, CompareFunction, CullMode, FrontFace, PrimitiveTopology,
    VertexFormat, VertexScalar,
};
use stratum_core::renderer::api::util::IndexFormat;

/// A local extension trait to convert our engine's types into OpenGL enums.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_gl()` syntax.
pub trait IntoGl<T> {
    /// Consumes self and converts it into an OpenGL-compatible value.
    fn into_gl(self) -> T;
}

impl IntoGl<u32> for PrimitiveTopology {
    fn into_gl(self) -> u32 {
        match self {
            PrimitiveTopology::PointList => glow::POINTS,
            PrimitiveTopology::LineList => glow::LINES,
            PrimitiveTopology::LineStrip => glow::LINE_STRIP,
            PrimitiveTopology::TriangleList => glow::TRIANGLES,
            PrimitiveTopology::TriangleStrip => glow::TRIANGLE_STRIP,
        }
    }
}

impl IntoGl<u32> for CompareFunction {
    fn into_gl(self) -> u32 {
        match self {
            CompareFunction::Never => glow::NEVER,
            CompareFunction::Less => glow::LESS,
            CompareFunction::Equal => glow::EQUAL,
            CompareFunction::LessEqual => glow::LEQUAL,
            CompareFunction::Greater => glow::GREATER,
            CompareFunction::NotEqual => glow::NOTEQUAL,
            CompareFunction::GreaterEqual => glow::GEQUAL,
            CompareFunction::Always => glow::ALWAYS,
        }
    }
}

impl IntoGl<u32> for BlendFactor {
    fn into_gl(self) -> u32 {
        match self {
            BlendFactor::Zero => glow::ZERO,
            BlendFactor::One => glow::ONE,
            BlendFactor::SrcColor => glow::SRC_COLOR,
            BlendFactor::OneMinusSrcColor => glow::ONE_MINUS_SRC_COLOR,
            BlendFactor::SrcAlpha => glow::SRC_ALPHA,
            BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
            BlendFactor::DstColor => glow::DST_COLOR,
            BlendFactor::OneMinusDstColor => glow::ONE_MINUS_DST_COLOR,
            BlendFactor::DstAlpha => glow::DST_ALPHA,
            BlendFactor::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
        }
    }
}

impl IntoGl<u32> for BlendOperation {
    fn into_gl(self) -> u32 {
        match self {
            BlendOperation::Add => glow::FUNC_ADD,
            BlendOperation::Subtract => glow::FUNC_SUBTRACT,
            BlendOperation::ReverseSubtract => glow::FUNC_REVERSE_SUBTRACT,
            BlendOperation::Min => glow::MIN,
            BlendOperation::Max => glow::MAX,
        }
    }
}

/// `None` means face culling stays disabled.
impl IntoGl<Option<u32>> for CullMode {
    fn into_gl(self) -> Option<u32> {
        match self {
            CullMode::None => None,
            CullMode::Front => Some(glow::FRONT),
            CullMode::Back => Some(glow::BACK),
        }
    }
}

impl IntoGl<u32> for FrontFace {
    fn into_gl(self) -> u32 {
        match self {
            FrontFace::Ccw => glow::CCW,
            FrontFace::Cw => glow::CW,
        }
    }
}

impl IntoGl<u32> for IndexFormat {
    fn into_gl(self) -> u32 {
        match self {
            IndexFormat::Uint16 => glow::UNSIGNED_SHORT,
            IndexFormat::Uint32 => glow::UNSIGNED_INT,
        }
    }
}

impl IntoGl<u32> for VertexScalar {
    fn into_gl(self) -> u32 {
        match self {
            VertexScalar::U8 => glow::UNSIGNED_BYTE,
            VertexScalar::I16 => glow::SHORT,
            VertexScalar::F16 => glow::HALF_FLOAT,
            VertexScalar::F32 => glow::FLOAT,
            VertexScalar::U32 => glow::UNSIGNED_INT,
            VertexScalar::I32 => glow::INT,
        }
    }
}

/// The buffer data usage hint for a buffer kind.
impl IntoGl<u32> for BufferKind {
    fn into_gl(self) -> u32 {
        match self {
            BufferKind::DeviceOnly => glow::STATIC_DRAW,
            BufferKind::Mappable => glow::DYNAMIC_DRAW,
            BufferKind::Staging => glow::STREAM_COPY,
        }
    }
}

/// The native description of one vertex attribute's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlVertexFormat {
    /// Component count.
    pub size: i32,
    /// Component type.
    pub data_type: u32,
    /// Fixed-point components are normalized when read as floats.
    pub normalized: bool,
    /// Components are read as integers.
    pub integer: bool,
}

impl IntoGl<GlVertexFormat> for VertexFormat {
    fn into_gl(self) -> GlVertexFormat {
        GlVertexFormat {
            size: self.component_count() as i32,
            data_type: self.scalar().into_gl(),
            normalized: self.is_normalized(),
            integer: self.is_integer(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_format_conversion() {
        let float3: GlVertexFormat = VertexFormat::Float32x3.into_gl();
        assert_eq!(
            float3,
            GlVertexFormat {
                size: 3,
                data_type: glow::FLOAT,
                normalized: false,
                integer: false,
            }
        );

        let unorm: GlVertexFormat = VertexFormat::Unorm8x4.into_gl();
        assert!(unorm.normalized);
        assert!(!unorm.integer);
        assert_eq!(unorm.data_type, glow::UNSIGNED_BYTE);

        let uint: GlVertexFormat = VertexFormat::Uint32x2.into_gl();
        assert!(uint.integer);
        assert_eq!(uint.size, 2);
    }

    #[test]
    fn test_cull_mode_none_disables_culling() {
        let none: Option<u32> = CullMode::None.into_gl();
        let back: Option<u32> = CullMode::Back.into_gl();
        assert_eq!(none, None);
        assert_eq!(back, Some(glow::BACK));
    }

    #[test]
    fn test_index_format_conversion() {
        let short: u32 = IndexFormat::Uint16.into_gl();
        assert_eq!(short, glow::UNSIGNED_SHORT);
    }
}
