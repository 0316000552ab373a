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

//! How vertex and index bindings reach the native context.
//!
//! The desktop core profile has separate attribute formats: the layout lives
//! in the pipeline's vertex array and a binding is one native call, so binds
//! are recorded as they come. OpenGL ES 3.0 only has attribute pointers, which
//! combine the layout with the buffer, so bindings are staged per slot and
//! flushed as one command right before the draw that needs them.

use super::command::{AttributePointer, Command};
use super::command_list::CommandList;
use super::conversions::{GlVertexFormat, IntoGl};
use super::device::GlProfile;
use super::native::GlBuffer;
use super::resources::GlPipelineEntry;
use std::collections::BTreeMap;
use stratum_core::renderer::api::pipeline::VertexStepMode;
use stratum_core::renderer::ArgumentError;

/// A vertex buffer resolved for one binding slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolvedVertexBuffer {
    pub buffer: GlBuffer,
    pub offset: u64,
    pub stride: u64,
}

#[derive(Debug)]
pub(crate) enum DrawStrategy {
    /// Desktop core profile.
    Immediate,
    /// OpenGL ES 3.0.
    Deferred(StagedBindings),
}

#[derive(Debug, Default)]
pub(crate) struct StagedBindings {
    vertex: BTreeMap<u32, ResolvedVertexBuffer>,
    index: Option<GlBuffer>,
    dirty: bool,
    flushed_base_vertex: i32,
}

impl DrawStrategy {
    pub fn for_profile(profile: GlProfile) -> Self {
        match profile {
            GlProfile::Core => DrawStrategy::Immediate,
            GlProfile::Es3 => DrawStrategy::Deferred(StagedBindings::default()),
        }
    }

    pub fn bind_vertex_buffer(
        &mut self,
        list: &mut CommandList,
        slot: u32,
        vertex: ResolvedVertexBuffer,
    ) {
        match self {
            DrawStrategy::Immediate => list.push(Command::BindVertexBuffer {
                binding: slot,
                buffer: vertex.buffer,
                offset: vertex.offset,
                stride: vertex.stride,
            }),
            DrawStrategy::Deferred(staged) => {
                staged.vertex.insert(slot, vertex);
                staged.dirty = true;
            }
        }
    }

    pub fn bind_index_buffer(&mut self, list: &mut CommandList, buffer: GlBuffer) {
        match self {
            DrawStrategy::Immediate => list.push(Command::BindIndexBuffer(buffer)),
            DrawStrategy::Deferred(staged) => {
                staged.index = Some(buffer);
                staged.dirty = true;
            }
        }
    }

    /// Bindings do not survive a pipeline change.
    pub fn pipeline_bound(&mut self) {
        if let DrawStrategy::Deferred(staged) = self {
            staged.vertex.clear();
            staged.index = None;
            staged.dirty = true;
        }
    }

    /// Emits whatever the draw needs and returns the base vertex the draw
    /// command itself must carry. Nothing is emitted when it fails.
    pub fn prepare_draw(
        &mut self,
        list: &mut CommandList,
        pipeline: &GlPipelineEntry,
        base_vertex: i32,
    ) -> Result<i32, ArgumentError> {
        let DrawStrategy::Deferred(staged) = self else {
            return Ok(base_vertex);
        };
        // Attribute pointers carry the base vertex, ES 3.0 has no base-vertex draws.
        if staged.dirty || staged.flushed_base_vertex != base_vertex {
            let attributes = staged.attribute_pointers(pipeline, base_vertex)?;
            if !attributes.is_empty() || staged.index.is_some() {
                list.push(Command::FlushVertexBindings {
                    attributes,
                    index_buffer: staged.index,
                });
            }
            staged.dirty = false;
            staged.flushed_base_vertex = base_vertex;
        }
        Ok(0)
    }

    pub fn reset(&mut self) {
        if let DrawStrategy::Deferred(staged) = self {
            *staged = StagedBindings::default();
        }
    }
}

impl StagedBindings {
    fn attribute_pointers(
        &self,
        pipeline: &GlPipelineEntry,
        base_vertex: i32,
    ) -> Result<Vec<AttributePointer>, ArgumentError> {
        let mut pointers = Vec::new();
        for layout in &pipeline.vertex_buffers {
            let Some(vertex) = self.vertex.get(&layout.binding) else {
                continue;
            };
            let (shift, divisor) = match layout.step_mode {
                VertexStepMode::Vertex => (i64::from(base_vertex) * vertex.stride as i64, 0),
                VertexStepMode::Instance => (0, 1),
            };
            for attribute in &layout.attributes {
                let format: GlVertexFormat = attribute.format.into_gl();
                let start = (vertex.offset + attribute.offset) as i64 + shift;
                let offset =
                    u64::try_from(start).map_err(|_| ArgumentError::BaseVertexOutOfRange {
                        binding: layout.binding,
                        base_vertex,
                    })?;
                pointers.push(AttributePointer {
                    buffer: vertex.buffer,
                    location: attribute.shader_location,
                    size: format.size,
                    data_type: format.data_type,
                    normalized: format.normalized,
                    integer: format.integer,
                    stride: vertex.stride,
                    offset,
                    divisor,
                });
            }
        }
        Ok(pointers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gl::native::GlProgram;
    use std::num::NonZeroU32;
    use std::sync::Arc;
    use stratum_core::renderer::api::pipeline::{
        FixedFunctionState, VertexAttribute, VertexBufferLayout, VertexFormat,
    };

    fn buffer(name: u32) -> GlBuffer {
        GlBuffer(NonZeroU32::new(name).unwrap())
    }

    fn pipeline() -> GlPipelineEntry {
        GlPipelineEntry {
            program: GlProgram(NonZeroU32::new(1).unwrap()),
            vertex_array: None,
            owns_vertex_array: false,
            mode: glow::TRIANGLES,
            vertex_buffers: vec![VertexBufferLayout {
                binding: 0,
                array_stride: 12,
                step_mode: VertexStepMode::Vertex,
                attributes: vec![VertexAttribute {
                    shader_location: 0,
                    format: VertexFormat::Float32x3,
                    offset: 0,
                }],
            }],
            uniforms: Arc::from(Vec::new()),
            fixed_function: FixedFunctionState::default(),
        }
    }

    fn vertex(name: u32) -> ResolvedVertexBuffer {
        ResolvedVertexBuffer {
            buffer: buffer(name),
            offset: 0,
            stride: 12,
        }
    }

    #[test]
    fn test_immediate_records_every_bind() {
        let mut strategy = DrawStrategy::for_profile(GlProfile::Core);
        let mut list = CommandList::new();
        strategy.bind_vertex_buffer(&mut list, 0, vertex(1));
        strategy.bind_vertex_buffer(&mut list, 0, vertex(2));
        assert_eq!(list.len(), 2);
        assert_eq!(strategy.prepare_draw(&mut list, &pipeline(), 5), Ok(5));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_deferred_last_write_wins() {
        let mut strategy = DrawStrategy::for_profile(GlProfile::Es3);
        let mut list = CommandList::new();
        strategy.bind_vertex_buffer(&mut list, 0, vertex(1));
        strategy.bind_vertex_buffer(&mut list, 0, vertex(2));
        assert!(list.is_empty());

        assert_eq!(strategy.prepare_draw(&mut list, &pipeline(), 0), Ok(0));
        assert_eq!(list.len(), 1);
        match &list.commands()[0] {
            Command::FlushVertexBindings { attributes, .. } => {
                assert_eq!(attributes.len(), 1);
                assert_eq!(attributes[0].buffer, buffer(2));
            }
            other => panic!("unexpected command {other:?}"),
        }

        // Clean bindings are not flushed again.
        strategy.prepare_draw(&mut list, &pipeline(), 0).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_deferred_folds_base_vertex_into_offsets() {
        let mut strategy = DrawStrategy::for_profile(GlProfile::Es3);
        let mut list = CommandList::new();
        strategy.bind_vertex_buffer(&mut list, 0, vertex(1));
        strategy.prepare_draw(&mut list, &pipeline(), 0).unwrap();
        strategy.prepare_draw(&mut list, &pipeline(), 4).unwrap();

        assert_eq!(list.len(), 2);
        match &list.commands()[1] {
            Command::FlushVertexBindings { attributes, .. } => {
                assert_eq!(attributes[0].offset, 48);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_deferred_rejects_base_vertex_before_buffer_start() {
        let mut strategy = DrawStrategy::for_profile(GlProfile::Es3);
        let mut list = CommandList::new();
        strategy.bind_vertex_buffer(
            &mut list,
            0,
            ResolvedVertexBuffer {
                offset: 12,
                ..vertex(1)
            },
        );
        assert_eq!(
            strategy.prepare_draw(&mut list, &pipeline(), -2),
            Err(ArgumentError::BaseVertexOutOfRange {
                binding: 0,
                base_vertex: -2,
            })
        );
        assert!(list.is_empty());

        // One vertex back from a 12-byte offset stays inside the buffer.
        assert_eq!(strategy.prepare_draw(&mut list, &pipeline(), -1), Ok(0));
        match &list.commands()[0] {
            Command::FlushVertexBindings { attributes, .. } => {
                assert_eq!(attributes[0].offset, 0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_immediate_passes_negative_base_vertex_through() {
        let mut strategy = DrawStrategy::for_profile(GlProfile::Core);
        let mut list = CommandList::new();
        strategy.bind_vertex_buffer(&mut list, 0, vertex(1));
        assert_eq!(strategy.prepare_draw(&mut list, &pipeline(), -2), Ok(-2));
    }
}
