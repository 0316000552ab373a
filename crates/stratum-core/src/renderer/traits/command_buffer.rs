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

use crate::renderer::api::command::{SubmissionFence, VertexBufferBinding};
use crate::renderer::api::pass::{RenderPassBeginInfo, ScissorRect, Viewport};
use crate::renderer::error::{RecordError, RenderError};
use crate::renderer::{BufferId, IndexFormat, PipelineId};

/// A recording unit for GPU work.
///
/// Recording never touches the native API: every call validates its arguments
/// against the current recording state and appends zero or more self-contained
/// commands to the buffer's command list. Errors are reported synchronously and
/// leave the list untouched; a buffer that failed mid-recording should be
/// discarded (or restarted with [`begin`](CommandBuffer::begin)).
///
/// The lifecycle is `begin` → recording calls → `end` → `submit`. `begin`
/// clears whatever the buffer held before, so one buffer can be reused for
/// every frame.
pub trait CommandBuffer: Send {
    /// Clears the command list and recording context and starts recording.
    fn begin(&mut self) -> Result<(), RecordError>;

    /// Seals the command list. Any render pass still open is an error.
    fn end(&mut self) -> Result<(), RecordError>;

    /// Hands the sealed command list to the command processor for execution.
    ///
    /// Execution happens in order, on the thread owning the native context.
    fn submit(&mut self) -> Result<SubmissionFence, RenderError>;

    /// Begins a render pass on the given frame buffer.
    fn begin_render_pass(&mut self, info: &RenderPassBeginInfo<'_>) -> Result<(), RecordError>;

    /// Ends the active render pass, restoring every piece of global state the
    /// pass changed.
    fn end_render_pass(&mut self) -> Result<(), RecordError>;

    /// Binds a pipeline for subsequent draw calls.
    fn bind_pipeline(&mut self, pipeline: PipelineId) -> Result<(), RecordError>;

    /// Binds a vertex buffer to a binding slot.
    fn bind_vertex_buffer(
        &mut self,
        slot: u32,
        buffer: BufferId,
        offset: u64,
    ) -> Result<(), RecordError>;

    /// Binds consecutive vertex binding slots starting at `first_slot`.
    ///
    /// Either all bindings are recorded or none is.
    fn bind_vertex_buffers(
        &mut self,
        first_slot: u32,
        bindings: &[VertexBufferBinding],
    ) -> Result<(), RecordError>;

    /// Binds an index buffer for indexed drawing.
    fn bind_index_buffer(
        &mut self,
        buffer: BufferId,
        offset: u64,
        format: IndexFormat,
    ) -> Result<(), RecordError>;

    /// Binds a range of a uniform buffer to a binding point declared by the
    /// bound pipeline's resource layout.
    fn bind_uniform_buffer(
        &mut self,
        binding: u32,
        buffer: BufferId,
        offset: u64,
        size: u64,
    ) -> Result<(), RecordError>;

    /// Sets the viewport until the next pipeline bind or the end of the pass.
    fn set_viewport(&mut self, viewport: Viewport) -> Result<(), RecordError>;

    /// Sets the scissor rectangle until the next pipeline bind or the end of the pass.
    fn set_scissor(&mut self, scissor: ScissorRect) -> Result<(), RecordError>;

    /// Records a non-indexed, instanced draw call.
    fn draw_instanced(
        &mut self,
        vertex_count: u32,
        first_vertex: u32,
        instance_count: u32,
    ) -> Result<(), RecordError>;

    /// Records an indexed, instanced draw call.
    ///
    /// The native element offset is `first_index * index width + bound offset`.
    fn draw_indexed_instanced(
        &mut self,
        index_count: u32,
        first_index: u32,
        base_vertex: i32,
        instance_count: u32,
    ) -> Result<(), RecordError>;

    /// Records a non-indexed draw call.
    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<(), RecordError> {
        self.draw_instanced(vertex_count, first_vertex, 1)
    }

    /// Records an indexed draw call.
    fn draw_indexed(&mut self, index_count: u32, first_index: u32) -> Result<(), RecordError> {
        self.draw_indexed_instanced(index_count, first_index, 0, 1)
    }

    /// Records a host-data write into a mappable or staging buffer.
    ///
    /// The bytes are copied at record time.
    fn store_data(&mut self, buffer: BufferId, offset: u64, data: &[u8]) -> Result<(), RecordError>;

    /// Records a buffer-to-buffer copy. Must be recorded outside a render pass.
    fn copy_buffer(
        &mut self,
        source: BufferId,
        source_offset: u64,
        destination: BufferId,
        destination_offset: u64,
        size: u64,
    ) -> Result<(), RecordError>;

    /// Records the upload of a staging buffer's whole content into a device-only buffer.
    fn use_staging_buffer(
        &mut self,
        staging: BufferId,
        destination: BufferId,
    ) -> Result<(), RecordError>;
}

/// Typed conveniences on top of [`CommandBuffer`].
pub trait CommandBufferExt: CommandBuffer {
    /// Records a write of plain-old-data values into a mappable or staging buffer.
    fn store_pod<T: bytemuck::Pod>(
        &mut self,
        buffer: BufferId,
        offset: u64,
        data: &[T],
    ) -> Result<(), RecordError> {
        self.store_data(buffer, offset, bytemuck::cast_slice(data))
    }
}

impl<C: CommandBuffer + ?Sized> CommandBufferExt for C {}

/// Hands out command buffers and executes their command lists.
///
/// Command buffers submitted through one processor execute in submission order.
pub trait CommandProcessor: Send + Sync {
    /// Allocates a new command buffer bound to this processor.
    fn allocate_command_buffer(&self) -> Box<dyn CommandBuffer>;

    /// Blocks until every command list submitted so far has executed.
    fn wait_idle(&self) -> Result<(), RenderError>;
}
