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

//! Main pipeline descriptors.

use super::layout::ResourceLayoutId;
use super::state::*;
use crate::renderer::api::shader::ShaderProgramId;
use crate::renderer::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;

/// A complete descriptor for a pipeline.
///
/// This struct aggregates all the state needed to render primitives.
#[derive(Debug, Clone)]
pub struct PipelineDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The backend-ready shader program.
    pub program: ShaderProgramId,
    /// The resource layout, if the program reads any uniform buffers.
    pub layout: Option<ResourceLayoutId>,
    /// The layout of the vertex buffers. Empty for pipelines that generate
    /// their vertices in the shader.
    pub vertex_buffers: Cow<'a, [VertexBufferLayout]>,
    /// Fixed-function state.
    pub fixed_function: FixedFunctionState,
}

impl<'a> PipelineDescriptor<'a> {
    /// Creates a descriptor with no vertex inputs and default fixed-function state.
    pub fn new(program: ShaderProgramId) -> Self {
        Self {
            label: None,
            program,
            layout: None,
            vertex_buffers: Cow::Borrowed(&[]),
            fixed_function: FixedFunctionState::default(),
        }
    }

    /// Returns `true` if the pipeline consumes vertex buffers.
    pub fn has_vertex_inputs(&self) -> bool {
        self.vertex_buffers.iter().any(|b| !b.attributes.is_empty())
    }

    /// Checks the vertex input layout against itself and the device limit.
    pub fn validate(&self, max_vertex_bindings: u32) -> Result<(), PipelineError> {
        if !self.program.is_valid() {
            return Err(PipelineError::InvalidShaderProgram(self.program));
        }

        let mut bindings = HashSet::new();
        let mut locations = HashSet::new();
        for buffer in self.vertex_buffers.iter() {
            if buffer.binding >= max_vertex_bindings {
                return Err(PipelineError::VertexBindingLimit {
                    binding: buffer.binding,
                    limit: max_vertex_bindings,
                });
            }
            if !bindings.insert(buffer.binding) {
                return Err(PipelineError::DuplicateVertexBinding {
                    binding: buffer.binding,
                });
            }
            for attribute in &buffer.attributes {
                if !locations.insert(attribute.shader_location) {
                    return Err(PipelineError::DuplicateShaderLocation {
                        location: attribute.shader_location,
                    });
                }
                // A zero stride means tightly packed, which GL resolves itself.
                if buffer.array_stride != 0
                    && attribute.offset + attribute.format.size() > buffer.array_stride
                {
                    return Err(PipelineError::AttributeOutsideStride {
                        binding: buffer.binding,
                        location: attribute.shader_location,
                    });
                }
            }
        }
        Ok(())
    }
}

/// An opaque handle to a compiled pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PipelineId(pub usize);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::pipeline::{VertexFormat, VertexStepMode};

    fn position_color_layout() -> VertexBufferLayout {
        VertexBufferLayout {
            binding: 0,
            array_stride: 28,
            step_mode: VertexStepMode::Vertex,
            attributes: vec![
                VertexAttribute {
                    shader_location: 0,
                    format: VertexFormat::Float32x3,
                    offset: 0,
                },
                VertexAttribute {
                    shader_location: 1,
                    format: VertexFormat::Float32x4,
                    offset: 12,
                },
            ],
        }
    }

    #[test]
    fn test_valid_descriptor() {
        let mut desc = PipelineDescriptor::new(ShaderProgramId(7));
        assert!(!desc.has_vertex_inputs());
        desc.vertex_buffers = Cow::Owned(vec![position_color_layout()]);
        assert!(desc.has_vertex_inputs());
        assert_eq!(desc.validate(16), Ok(()));
    }

    #[test]
    fn test_rejects_null_program() {
        let desc = PipelineDescriptor::new(ShaderProgramId(0));
        assert_eq!(
            desc.validate(16),
            Err(PipelineError::InvalidShaderProgram(ShaderProgramId(0)))
        );
    }

    #[test]
    fn test_rejects_attribute_overflowing_stride() {
        let mut layout = position_color_layout();
        layout.array_stride = 20;
        let mut desc = PipelineDescriptor::new(ShaderProgramId(1));
        desc.vertex_buffers = Cow::Owned(vec![layout]);
        assert_eq!(
            desc.validate(16),
            Err(PipelineError::AttributeOutsideStride {
                binding: 0,
                location: 1
            })
        );
    }

    #[test]
    fn test_rejects_duplicates_and_limits() {
        let mut second = position_color_layout();
        second.binding = 1;
        let mut desc = PipelineDescriptor::new(ShaderProgramId(1));
        desc.vertex_buffers = Cow::Owned(vec![position_color_layout(), second]);
        assert_eq!(
            desc.validate(16),
            Err(PipelineError::DuplicateShaderLocation { location: 0 })
        );

        let mut far = position_color_layout();
        far.binding = 16;
        desc.vertex_buffers = Cow::Owned(vec![far]);
        assert_eq!(
            desc.validate(16),
            Err(PipelineError::VertexBindingLimit {
                binding: 16,
                limit: 16
            })
        );

        desc.vertex_buffers = Cow::Owned(vec![position_color_layout(), position_color_layout()]);
        assert_eq!(
            desc.validate(16),
            Err(PipelineError::DuplicateVertexBinding { binding: 0 })
        );
    }
}
