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

//! The recording engine: explicit command-buffer calls in, self-contained
//! native commands out.

use std::collections::BTreeSet;
use std::sync::Arc;

use stratum_core::math::Extent2D;
use stratum_core::renderer::api::buffer::{BufferId, BufferKind, BufferUsage};
use stratum_core::renderer::api::command::{SubmissionFence, VertexBufferBinding};
use stratum_core::renderer::api::pass::{
    ClearValue, LoadOp, RenderPassBeginInfo, ScissorRect, StoreOp, Viewport,
};
use stratum_core::renderer::api::util::IndexFormat;
use stratum_core::renderer::traits::CommandBuffer;
use stratum_core::renderer::{
    ArgumentError, GraphicsDevice, PipelineId, RecordError, RenderError, StateError,
};

use super::command::{ClearOp, Command};
use super::command_list::CommandList;
use super::conversions::IntoGl;
use super::device::GlDevice;
use super::native::{GlBuffer, GlFramebuffer};
use super::resources::{GlBufferEntry, GlPipelineEntry, GlRenderPassEntry};
use super::shadow::{PipelineShadow, ShadowPhase};
use super::strategy::{DrawStrategy, ResolvedVertexBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordingState {
    Initial,
    Recording,
    Sealed,
}

#[derive(Debug)]
struct ActivePass {
    framebuffer: Option<GlFramebuffer>,
    invalidate: Vec<u32>,
}

#[derive(Debug, Clone, Copy)]
struct IndexBinding {
    offset: u64,
    format: IndexFormat,
}

/// A command buffer for the OpenGL backends.
///
/// Recording validates each call against the recording context (active pass,
/// bound pipeline, bound buffers) and appends commands to a [`CommandList`].
/// Nothing touches the native context until the list is submitted.
#[derive(Debug)]
pub struct GlCommandBuffer {
    device: GlDevice,
    processor: usize,
    state: RecordingState,
    list: CommandList,
    shadow: PipelineShadow,
    strategy: DrawStrategy,
    pass: Option<ActivePass>,
    pipeline: Option<Arc<GlPipelineEntry>>,
    vertex_slots: BTreeSet<u32>,
    index: Option<IndexBinding>,
    /// Copy destinations recorded in this session, marked uploaded on submit.
    uploads: Vec<Arc<GlBufferEntry>>,
}

impl GlCommandBuffer {
    pub(crate) fn new(device: GlDevice, processor: usize) -> Self {
        let strategy = DrawStrategy::for_profile(device.profile());
        Self {
            device,
            processor,
            state: RecordingState::Initial,
            list: CommandList::new(),
            shadow: PipelineShadow::new(),
            strategy,
            pass: None,
            pipeline: None,
            vertex_slots: BTreeSet::new(),
            index: None,
            uploads: Vec::new(),
        }
    }

    /// The commands recorded so far.
    pub fn command_list(&self) -> &CommandList {
        &self.list
    }

    /// Where the pipeline-state shadow currently is.
    pub fn shadow_phase(&self) -> ShadowPhase {
        self.shadow.phase()
    }

    fn reset_context(&mut self) {
        self.shadow.reset();
        self.strategy.reset();
        self.pass = None;
        self.pipeline = None;
        self.vertex_slots.clear();
        self.index = None;
    }

    fn ensure_recording(&self) -> Result<(), StateError> {
        match self.state {
            RecordingState::Recording => Ok(()),
            _ => Err(StateError::NotRecording),
        }
    }

    fn ensure_pass(&self) -> Result<&ActivePass, StateError> {
        self.ensure_recording()?;
        self.pass.as_ref().ok_or(StateError::NoRenderPass)
    }

    fn bound_pipeline(&self) -> Result<Arc<GlPipelineEntry>, StateError> {
        self.ensure_pass()?;
        self.pipeline.clone().ok_or(StateError::NoPipeline)
    }

    fn buffer(
        &self,
        id: BufferId,
        required: BufferUsage,
    ) -> Result<Arc<GlBufferEntry>, ArgumentError> {
        let entry = self
            .device
            .buffer_entry(id)
            .ok_or(ArgumentError::UnknownBuffer(id))?;
        if !entry.info.usage.contains(required) {
            return Err(ArgumentError::BufferUsage {
                buffer: id,
                required,
            });
        }
        Ok(entry)
    }

    /// Looks up a buffer the GPU is about to read from.
    fn readable_buffer(
        &self,
        id: BufferId,
        required: BufferUsage,
    ) -> Result<Arc<GlBufferEntry>, ArgumentError> {
        let entry = self.buffer(id, required)?;
        if self.device.settings().validation
            && entry.info.kind == BufferKind::DeviceOnly
            && !entry.is_uploaded()
            && !self.uploads.iter().any(|upload| upload.info.id == id)
        {
            return Err(ArgumentError::UninitializedDeviceBuffer(id));
        }
        Ok(entry)
    }

    fn check_range(entry: &GlBufferEntry, offset: u64, size: u64) -> Result<(), ArgumentError> {
        if entry.info.contains_range(offset, size) {
            Ok(())
        } else {
            Err(ArgumentError::OutOfBounds {
                buffer: entry.info.id,
                offset,
                size,
                capacity: entry.info.size,
            })
        }
    }

    fn resolve_vertex_buffer(
        &self,
        pipeline: &GlPipelineEntry,
        slot: u32,
        buffer: BufferId,
        offset: u64,
    ) -> Result<ResolvedVertexBuffer, ArgumentError> {
        let limit = self.device.capabilities().max_vertex_bindings;
        let layout = pipeline
            .vertex_buffer(slot)
            .filter(|_| slot < limit)
            .ok_or(ArgumentError::BindingIndex {
                binding: slot,
                limit,
            })?;
        let entry = self.readable_buffer(buffer, BufferUsage::VERTEX)?;
        if offset >= entry.info.size {
            return Err(ArgumentError::OutOfBounds {
                buffer,
                offset,
                size: 0,
                capacity: entry.info.size,
            });
        }
        Ok(ResolvedVertexBuffer {
            buffer: entry.native,
            offset,
            stride: layout.effective_stride(),
        })
    }

    fn clear_ops(
        render_pass: &GlRenderPassEntry,
        overrides: &[ClearValue],
    ) -> Result<Vec<ClearOp>, ArgumentError> {
        if !overrides.is_empty() && overrides.len() != render_pass.attachment_count() {
            return Err(ArgumentError::ClearValueCount {
                expected: render_pass.attachment_count(),
                actual: overrides.len(),
            });
        }

        let mut clears = Vec::new();
        for (i, attachment) in render_pass.color.iter().enumerate() {
            let color = match (overrides.get(i), attachment.ops.load) {
                (Some(ClearValue::Depth(_)), _) => {
                    return Err(ArgumentError::ClearValueKind { index: i });
                }
                (_, LoadOp::Load) => continue,
                (Some(ClearValue::Color(color)), LoadOp::Clear(_)) => *color,
                (None, LoadOp::Clear(color)) => color,
            };
            clears.push(ClearOp {
                buffer: glow::COLOR,
                draw_buffer: i as u32,
                values: color.to_array(),
            });
        }
        if let Some(depth) = render_pass.depth {
            let index = render_pass.color.len();
            let value = match (overrides.get(index), depth.ops.load) {
                (Some(ClearValue::Color(_)), _) => {
                    return Err(ArgumentError::ClearValueKind { index });
                }
                (_, LoadOp::Load) => None,
                (Some(ClearValue::Depth(value)), LoadOp::Clear(_)) => Some(*value),
                (None, LoadOp::Clear(value)) => Some(value),
            };
            if let Some(value) = value {
                clears.push(ClearOp {
                    buffer: glow::DEPTH,
                    draw_buffer: 0,
                    values: [value, 0.0, 0.0, 0.0],
                });
            }
        }
        Ok(clears)
    }

    fn invalidated_attachments(
        render_pass: &GlRenderPassEntry,
        framebuffer: Option<GlFramebuffer>,
    ) -> Vec<u32> {
        let default_framebuffer = framebuffer.is_none();
        let mut attachments = Vec::new();
        for (i, attachment) in render_pass.color.iter().enumerate() {
            if attachment.ops.store == StoreOp::Discard {
                attachments.push(if default_framebuffer {
                    glow::COLOR
                } else {
                    glow::COLOR_ATTACHMENT0 + i as u32
                });
            }
        }
        if let Some(depth) = render_pass.depth {
            if depth.ops.store == StoreOp::Discard {
                attachments.push(if default_framebuffer {
                    glow::DEPTH
                } else {
                    glow::DEPTH_ATTACHMENT
                });
            }
        }
        attachments
    }

    fn check_vertex_inputs(&self, pipeline: &GlPipelineEntry) -> Result<(), StateError> {
        match pipeline
            .vertex_buffers
            .iter()
            .find(|layout| !self.vertex_slots.contains(&layout.binding))
        {
            Some(layout) => Err(StateError::MissingVertexBinding {
                binding: layout.binding,
            }),
            None => Ok(()),
        }
    }
}

impl CommandBuffer for GlCommandBuffer {
    fn begin(&mut self) -> Result<(), RecordError> {
        if self.state == RecordingState::Recording {
            return Err(StateError::AlreadyRecording.into());
        }
        if self.state == RecordingState::Sealed {
            log::debug!("Discarding a sealed command list that was never submitted.");
        }
        self.list.clear();
        self.uploads.clear();
        self.reset_context();
        self.state = RecordingState::Recording;
        Ok(())
    }

    fn end(&mut self) -> Result<(), RecordError> {
        self.ensure_recording()?;
        if self.pass.is_some() {
            return Err(StateError::RenderPassActive.into());
        }
        debug_assert!(self.list.pending_restore().is_empty());
        self.state = RecordingState::Sealed;
        Ok(())
    }

    fn submit(&mut self) -> Result<SubmissionFence, RenderError> {
        if self.state != RecordingState::Sealed {
            return Err(RecordError::from(StateError::NotSealed).into());
        }
        let list = std::mem::take(&mut self.list);
        self.state = RecordingState::Initial;
        log::trace!(
            "Submitting {} commands on processor {}.",
            list.len(),
            self.processor
        );

        let (signal, fence) = SubmissionFence::pair();
        self.device.submit(list, signal)?;
        for upload in self.uploads.drain(..) {
            upload.mark_uploaded();
        }
        Ok(fence)
    }

    fn begin_render_pass(&mut self, info: &RenderPassBeginInfo<'_>) -> Result<(), RecordError> {
        self.ensure_recording()?;
        if self.pass.is_some() {
            return Err(StateError::RenderPassActive.into());
        }
        let frame_buffer = self
            .device
            .frame_buffer_entry(info.frame_buffer)
            .ok_or(ArgumentError::UnknownFrameBuffer(info.frame_buffer))?;
        let clears = Self::clear_ops(&frame_buffer.render_pass, info.clear_values)?;
        let extent: Extent2D = frame_buffer.extent;

        self.list.push(Command::BeginRenderPass {
            framebuffer: frame_buffer.target,
            width: extent.width,
            height: extent.height,
            clears,
        });
        self.shadow.begin_pass(extent);
        self.strategy.reset();
        self.pass = Some(ActivePass {
            framebuffer: frame_buffer.target,
            invalidate: Self::invalidated_attachments(&frame_buffer.render_pass, frame_buffer.target),
        });
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<(), RecordError> {
        self.ensure_pass()?;
        let Some(pass) = self.pass.take() else {
            return Err(StateError::NoRenderPass.into());
        };
        self.shadow.end_pass(&mut self.list);
        self.list.push(Command::EndRenderPass {
            framebuffer: pass.framebuffer,
            invalidate: pass.invalidate,
        });
        self.reset_context();
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: PipelineId) -> Result<(), RecordError> {
        self.ensure_pass()?;
        let entry = self
            .device
            .pipeline_entry(pipeline)
            .ok_or(ArgumentError::UnknownPipeline(pipeline))?;

        self.shadow.bind_pipeline(
            &mut self.list,
            entry.program,
            entry.vertex_array,
            &entry.fixed_function,
        );
        self.strategy.pipeline_bound();
        self.vertex_slots.clear();
        self.index = None;
        self.pipeline = Some(entry);
        Ok(())
    }

    fn bind_vertex_buffer(
        &mut self,
        slot: u32,
        buffer: BufferId,
        offset: u64,
    ) -> Result<(), RecordError> {
        let pipeline = self.bound_pipeline()?;
        let vertex = self.resolve_vertex_buffer(&pipeline, slot, buffer, offset)?;
        self.strategy.bind_vertex_buffer(&mut self.list, slot, vertex);
        self.vertex_slots.insert(slot);
        Ok(())
    }

    fn bind_vertex_buffers(
        &mut self,
        first_slot: u32,
        bindings: &[VertexBufferBinding],
    ) -> Result<(), RecordError> {
        let pipeline = self.bound_pipeline()?;
        let limit = self.device.capabilities().max_vertex_bindings;
        let mut resolved = Vec::with_capacity(bindings.len());
        for (i, binding) in bindings.iter().enumerate() {
            let slot = u32::try_from(i)
                .ok()
                .and_then(|i| first_slot.checked_add(i))
                .ok_or(ArgumentError::BindingIndex {
                    binding: u32::MAX,
                    limit,
                })?;
            let vertex =
                self.resolve_vertex_buffer(&pipeline, slot, binding.buffer, binding.offset)?;
            resolved.push((slot, vertex));
        }

        // No native multi-bind on either profile.
        for (slot, vertex) in resolved {
            self.strategy.bind_vertex_buffer(&mut self.list, slot, vertex);
            self.vertex_slots.insert(slot);
        }
        Ok(())
    }

    fn bind_index_buffer(
        &mut self,
        buffer: BufferId,
        offset: u64,
        format: IndexFormat,
    ) -> Result<(), RecordError> {
        self.bound_pipeline()?;
        let entry = self.readable_buffer(buffer, BufferUsage::INDEX)?;
        let alignment = format.byte_width();
        if offset % alignment != 0 {
            return Err(ArgumentError::IndexOffsetAlignment { offset, alignment }.into());
        }
        if offset >= entry.info.size {
            return Err(ArgumentError::OutOfBounds {
                buffer,
                offset,
                size: 0,
                capacity: entry.info.size,
            }
            .into());
        }
        let native: GlBuffer = entry.native;
        self.strategy.bind_index_buffer(&mut self.list, native);
        self.index = Some(IndexBinding { offset, format });
        Ok(())
    }

    fn bind_uniform_buffer(
        &mut self,
        binding: u32,
        buffer: BufferId,
        offset: u64,
        size: u64,
    ) -> Result<(), RecordError> {
        let pipeline = self.bound_pipeline()?;
        let limit = self.device.capabilities().max_uniform_bindings;
        let declared = pipeline
            .uniform(binding)
            .filter(|_| binding < limit)
            .ok_or(ArgumentError::BindingIndex { binding, limit })?;
        let entry = self.readable_buffer(buffer, BufferUsage::UNIFORM)?;
        if size == 0 || size < declared.min_size {
            return Err(ArgumentError::OutOfBounds {
                buffer,
                offset,
                size,
                capacity: entry.info.size,
            }
            .into());
        }
        Self::check_range(&entry, offset, size)?;

        self.shadow.bind_uniform(
            &mut self.list,
            binding,
            Command::BindUniformBuffer {
                binding,
                buffer: entry.native,
                offset,
                size,
            },
        );
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<(), RecordError> {
        self.bound_pipeline()?;
        self.shadow.set_viewport(&mut self.list, viewport);
        Ok(())
    }

    fn set_scissor(&mut self, scissor: ScissorRect) -> Result<(), RecordError> {
        self.bound_pipeline()?;
        self.shadow.set_scissor(&mut self.list, scissor);
        Ok(())
    }

    fn draw_instanced(
        &mut self,
        vertex_count: u32,
        first_vertex: u32,
        instance_count: u32,
    ) -> Result<(), RecordError> {
        let pipeline = self.bound_pipeline()?;
        self.check_vertex_inputs(&pipeline)?;

        self.strategy.prepare_draw(&mut self.list, &pipeline, 0)?;
        self.list.push(Command::Draw {
            mode: pipeline.mode,
            first: first_vertex,
            count: vertex_count,
            instances: instance_count,
        });
        Ok(())
    }

    fn draw_indexed_instanced(
        &mut self,
        index_count: u32,
        first_index: u32,
        base_vertex: i32,
        instance_count: u32,
    ) -> Result<(), RecordError> {
        let pipeline = self.bound_pipeline()?;
        self.check_vertex_inputs(&pipeline)?;
        let index = self.index.ok_or(StateError::NoIndexBuffer)?;

        let offset = u64::from(first_index) * index.format.byte_width() + index.offset;
        let base_vertex = self
            .strategy
            .prepare_draw(&mut self.list, &pipeline, base_vertex)?;
        self.list.push(Command::DrawIndexed {
            mode: pipeline.mode,
            count: index_count,
            element_type: index.format.into_gl(),
            offset,
            instances: instance_count,
            base_vertex,
        });
        Ok(())
    }

    fn store_data(&mut self, buffer: BufferId, offset: u64, data: &[u8]) -> Result<(), RecordError> {
        self.ensure_recording()?;
        let entry = self.buffer(buffer, BufferUsage::MAP_WRITE)?;
        Self::check_range(&entry, offset, data.len() as u64)?;
        if data.is_empty() {
            return Ok(());
        }
        self.list.push(Command::StoreData {
            buffer: entry.native,
            offset,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn copy_buffer(
        &mut self,
        source: BufferId,
        source_offset: u64,
        destination: BufferId,
        destination_offset: u64,
        size: u64,
    ) -> Result<(), RecordError> {
        self.ensure_recording()?;
        if self.pass.is_some() {
            return Err(StateError::RenderPassActive.into());
        }
        let src = self.buffer(source, BufferUsage::COPY_SRC)?;
        let dst = self.buffer(destination, BufferUsage::COPY_DST)?;
        Self::check_range(&src, source_offset, size)?;
        Self::check_range(&dst, destination_offset, size)?;
        if size == 0 {
            return Ok(());
        }

        self.list.push(Command::CopyBuffer {
            source: src.native,
            source_offset,
            destination: dst.native,
            destination_offset,
            size,
        });
        if !self.uploads.iter().any(|upload| Arc::ptr_eq(upload, &dst)) {
            self.uploads.push(dst);
        }
        Ok(())
    }

    fn use_staging_buffer(
        &mut self,
        staging: BufferId,
        destination: BufferId,
    ) -> Result<(), RecordError> {
        self.ensure_recording()?;
        let size = self
            .device
            .buffer_info(staging)
            .ok_or(ArgumentError::UnknownBuffer(staging))?
            .size;
        self.copy_buffer(staging, 0, destination, 0, size)
    }
}
