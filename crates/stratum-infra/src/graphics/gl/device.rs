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

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use stratum_core::math::Extent2D;
use stratum_core::renderer::api::buffer::{BufferDescriptor, BufferId, BufferInfo};
use stratum_core::renderer::api::command::FenceSignal;
use stratum_core::renderer::api::pass::{
    FrameBufferDescriptor, FrameBufferId, NativeFrameBuffer, RenderPassDescriptor, RenderPassId,
};
use stratum_core::renderer::api::pipeline::{
    PipelineDescriptor, PipelineId, ResourceLayoutDescriptor, ResourceLayoutId, VertexBufferLayout,
    VertexStepMode,
};
use stratum_core::renderer::api::settings::{BackendKind, DeviceCapabilities, DeviceSettings};
use stratum_core::renderer::traits::CommandProcessor;
use stratum_core::renderer::{
    GraphicsDevice, PipelineError, RenderError, ResourceError,
};

use super::command_list::CommandList;
use super::context_thread::{ContextFactory, ContextThread};
use super::conversions::{GlVertexFormat, IntoGl};
use super::native::{GlCall, GlContext, GlFramebuffer, GlProgram, GlVertexArray};
use super::processor::GlCommandProcessor;
use super::resources::{
    GlBufferEntry, GlFrameBufferEntry, GlPipelineEntry, GlRenderPassEntry, GlResourceLayoutEntry,
    Registry,
};
use super::surface::GlSurface;

/// The OpenGL flavor a device drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlProfile {
    /// Desktop OpenGL 4.3 core profile: separate attribute formats and
    /// base-vertex draws.
    Core,
    /// OpenGL ES 3.0: attribute pointers only.
    Es3,
}

impl GlProfile {
    pub fn from_backend(backend: BackendKind) -> Option<Self> {
        match backend {
            BackendKind::GlCore => Some(GlProfile::Core),
            BackendKind::GlEs3 => Some(GlProfile::Es3),
            BackendKind::Explicit => None,
        }
    }

    pub fn backend(self) -> BackendKind {
        match self {
            GlProfile::Core => BackendKind::GlCore,
            GlProfile::Es3 => BackendKind::GlEs3,
        }
    }

    pub fn capabilities(self) -> DeviceCapabilities {
        DeviceCapabilities {
            backend: self.backend(),
            max_vertex_bindings: 16,
            max_uniform_bindings: 24,
            multi_bind: false,
        }
    }
}

/// The internal, non-clonable state of the GlDevice.
#[derive(Debug)]
pub struct GlDeviceInternal {
    profile: GlProfile,
    settings: DeviceSettings,
    context: ContextThread,
    placeholder_vertex_array: GlVertexArray,

    buffers: Registry<BufferId, GlBufferEntry>,
    layouts: Registry<ResourceLayoutId, GlResourceLayoutEntry>,
    pipelines: Registry<PipelineId, GlPipelineEntry>,
    render_passes: Registry<RenderPassId, GlRenderPassEntry>,
    frame_buffers: Registry<FrameBufferId, GlFrameBufferEntry>,

    submissions: AtomicU64,
}

/// A clonable, thread-safe handle to an OpenGL device.
///
/// Command buffers, processors, and surfaces hold clones of it. The context
/// thread shuts down when the last clone is dropped.
#[derive(Clone, Debug)]
pub struct GlDevice {
    internal: Arc<GlDeviceInternal>,
}

fn backend_error(e: impl ToString) -> ResourceError {
    ResourceError::BackendError(e.to_string())
}

fn native_size(value: u64) -> Result<i32, ResourceError> {
    i32::try_from(value).map_err(|_| {
        ResourceError::InvalidDescriptor(format!("{value} bytes exceeds the native size limit"))
    })
}

impl GlDevice {
    /// Starts the context thread and creates the device on it.
    pub fn new(
        profile: GlProfile,
        settings: DeviceSettings,
        factory: ContextFactory,
    ) -> Result<Self, RenderError> {
        let name = match &settings.label {
            Some(label) => format!("stratum-gl-{label}"),
            None => "stratum-gl".to_owned(),
        };
        let context = ContextThread::spawn(&name, factory)?;

        // Bound by pipelines without vertex inputs; core profiles cannot draw
        // with vertex array zero.
        let placeholder_vertex_array = context
            .run(|gl| gl.create_vertex_array())?
            .map_err(RenderError::InitializationFailed)?;

        log::info!(
            "Created {:?} device with {} command processor(s).",
            profile,
            settings.command_processors
        );

        Ok(Self {
            internal: Arc::new(GlDeviceInternal {
                profile,
                settings,
                context,
                placeholder_vertex_array,
                buffers: Registry::new(),
                layouts: Registry::new(),
                pipelines: Registry::new(),
                render_passes: Registry::new(),
                frame_buffers: Registry::new(),
                submissions: AtomicU64::new(0),
            }),
        })
    }

    pub fn profile(&self) -> GlProfile {
        self.internal.profile
    }

    pub fn settings(&self) -> &DeviceSettings {
        &self.internal.settings
    }

    /// The number of command lists submitted so far.
    pub fn submission_count(&self) -> u64 {
        self.internal.submissions.load(Ordering::Relaxed)
    }

    /// Returns a concrete command processor, whose command buffers expose
    /// the lists they record.
    pub fn gl_command_processor(&self, index: usize) -> Option<GlCommandProcessor> {
        (index < self.internal.settings.command_processors)
            .then(|| GlCommandProcessor::new(self.clone(), index))
    }

    pub(crate) fn buffer_entry(&self, id: BufferId) -> Option<Arc<GlBufferEntry>> {
        self.internal.buffers.get(id)
    }

    pub(crate) fn pipeline_entry(&self, id: PipelineId) -> Option<Arc<GlPipelineEntry>> {
        self.internal.pipelines.get(id)
    }

    pub(crate) fn frame_buffer_entry(&self, id: FrameBufferId) -> Option<Arc<GlFrameBufferEntry>> {
        self.internal.frame_buffers.get(id)
    }

    pub(crate) fn submit(&self, list: CommandList, signal: FenceSignal) -> Result<(), RenderError> {
        self.internal.submissions.fetch_add(1, Ordering::Relaxed);
        self.internal.context.execute(list, signal)
    }

    /// Queues a presentation of the default framebuffer.
    pub(crate) fn swap_buffers(&self) -> Result<(), RenderError> {
        self.internal.context.post(|gl| {
            if let Err(e) = gl.swap_buffers() {
                log::error!("Failed to swap buffers: {}", e);
            }
        })
    }

    /// Gives a live frame buffer a new extent.
    pub(crate) fn resize_frame_buffer(
        &self,
        id: FrameBufferId,
        extent: Extent2D,
    ) -> Result<(), ResourceError> {
        let entry = self.frame_buffer_entry(id).ok_or(ResourceError::NotFound)?;
        let resized = GlFrameBufferEntry {
            render_pass: entry.render_pass.clone(),
            target: entry.target,
            extent,
        };
        if self.internal.frame_buffers.replace(id, resized) {
            Ok(())
        } else {
            Err(ResourceError::NotFound)
        }
    }

    /// Creates a presentation surface rendering through `descriptor` into the
    /// default framebuffer.
    pub fn create_surface(
        &self,
        descriptor: &RenderPassDescriptor,
        extent: Extent2D,
    ) -> Result<GlSurface, ResourceError> {
        let render_pass = self.create_render_pass(descriptor)?;
        let frame_buffer = self.internal.frame_buffers.generate_id(FrameBufferId);
        let render_pass_entry = self
            .internal
            .render_passes
            .get(render_pass)
            .ok_or(ResourceError::NotFound)?;
        self.internal.frame_buffers.insert(
            frame_buffer,
            GlFrameBufferEntry {
                render_pass: render_pass_entry,
                target: None,
                extent,
            },
        );
        Ok(GlSurface::new(self.clone(), render_pass, frame_buffer, extent))
    }

    fn upload(&self, buffer: &GlBufferEntry, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let native = buffer.native;
        let offset = native_size(offset)?;
        let data = data.to_vec();
        self.internal
            .context
            .post(move |gl| {
                gl.issue(GlCall::BindBuffer {
                    target: glow::COPY_WRITE_BUFFER,
                    buffer: Some(native),
                });
                gl.issue(GlCall::BufferSubData {
                    target: glow::COPY_WRITE_BUFFER,
                    offset,
                    data: data.into(),
                });
                gl.issue(GlCall::BindBuffer {
                    target: glow::COPY_WRITE_BUFFER,
                    buffer: None,
                });
            })
            .map_err(backend_error)
    }
}

/// Specifies a vertex array for `layouts`. Desktop vertex arrays also carry the
/// binding divisors; ES attribute pointers are specified per draw.
fn create_vertex_array(
    gl: &mut dyn GlContext,
    profile: GlProfile,
    layouts: &[VertexBufferLayout],
) -> Result<GlVertexArray, String> {
    let vao = gl.create_vertex_array()?;
    gl.issue(GlCall::BindVertexArray(Some(vao)));
    for layout in layouts {
        for attribute in &layout.attributes {
            gl.issue(GlCall::EnableVertexAttribArray(attribute.shader_location));
            if profile == GlProfile::Core {
                let format: GlVertexFormat = attribute.format.into_gl();
                gl.issue(GlCall::VertexAttribFormat {
                    index: attribute.shader_location,
                    size: format.size,
                    data_type: format.data_type,
                    normalized: format.normalized,
                    integer: format.integer,
                    relative_offset: attribute.offset as u32,
                });
                gl.issue(GlCall::VertexAttribBinding {
                    index: attribute.shader_location,
                    binding: layout.binding,
                });
            }
        }
        if profile == GlProfile::Core && layout.step_mode == VertexStepMode::Instance {
            gl.issue(GlCall::VertexBindingDivisor {
                binding: layout.binding,
                divisor: 1,
            });
        }
    }
    gl.issue(GlCall::BindVertexArray(None));
    Ok(vao)
}

impl GraphicsDevice for GlDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.internal.profile.capabilities()
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        descriptor.validate()?;
        let size = native_size(descriptor.size)?;
        let usage_hint = descriptor.kind.into_gl();

        let native = self
            .internal
            .context
            .run(move |gl| {
                let buffer = gl.create_buffer()?;
                gl.issue(GlCall::BindBuffer {
                    target: glow::COPY_WRITE_BUFFER,
                    buffer: Some(buffer),
                });
                gl.issue(GlCall::BufferData {
                    target: glow::COPY_WRITE_BUFFER,
                    size,
                    usage: usage_hint,
                });
                gl.issue(GlCall::BindBuffer {
                    target: glow::COPY_WRITE_BUFFER,
                    buffer: None,
                });
                Ok::<_, String>(buffer)
            })
            .map_err(backend_error)?
            .map_err(backend_error)?;

        let id = self.internal.buffers.generate_id(BufferId);
        self.internal.buffers.insert(
            id,
            GlBufferEntry {
                native,
                info: BufferInfo {
                    id,
                    kind: descriptor.kind,
                    usage: descriptor.resolved_usage(),
                    size: descriptor.size,
                },
                uploaded: AtomicBool::new(false),
            },
        );
        log::trace!(
            "Created {:?} buffer {:?} ({} bytes, label: {:?}).",
            descriptor.kind,
            id,
            descriptor.size,
            descriptor.label
        );
        Ok(id)
    }

    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        if !descriptor.kind.is_host_writable() {
            return Err(ResourceError::InvalidDescriptor(format!(
                "{:?} buffers cannot be filled from the host",
                descriptor.kind
            )));
        }
        if data.len() as u64 > descriptor.size {
            return Err(ResourceError::OutOfBounds);
        }
        let id = self.create_buffer(descriptor)?;
        self.write_buffer(id, 0, data)?;
        Ok(id)
    }

    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let entry = self.buffer_entry(id).ok_or(ResourceError::NotFound)?;
        if !entry.info.kind.is_host_writable() {
            return Err(ResourceError::InvalidDescriptor(format!(
                "buffer {:?} is {:?} and cannot be written from the host",
                id, entry.info.kind
            )));
        }
        if !entry.info.contains_range(offset, data.len() as u64) {
            return Err(ResourceError::OutOfBounds);
        }
        if data.is_empty() {
            return Ok(());
        }
        self.upload(&entry, offset, data)
    }

    fn buffer_info(&self, id: BufferId) -> Option<BufferInfo> {
        self.buffer_entry(id).map(|entry| entry.info)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let entry = self
            .internal
            .buffers
            .remove(id)
            .ok_or(ResourceError::NotFound)?;
        let native = entry.native;
        self.internal
            .context
            .post(move |gl| gl.issue(GlCall::DeleteBuffer(native)))
            .map_err(backend_error)
    }

    fn create_resource_layout(
        &self,
        descriptor: &ResourceLayoutDescriptor,
    ) -> Result<ResourceLayoutId, ResourceError> {
        let limit = self.capabilities().max_uniform_bindings;
        for (i, uniform) in descriptor.uniform_buffers.iter().enumerate() {
            if uniform.binding >= limit {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "uniform binding {} exceeds the device limit of {}",
                    uniform.binding, limit
                )));
            }
            if descriptor.uniform_buffers[..i]
                .iter()
                .any(|other| other.binding == uniform.binding)
            {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "uniform binding {} is declared more than once",
                    uniform.binding
                )));
            }
        }

        let id = self.internal.layouts.generate_id(ResourceLayoutId);
        self.internal.layouts.insert(
            id,
            GlResourceLayoutEntry {
                uniforms: descriptor.uniform_buffers.iter().copied().collect(),
            },
        );
        Ok(id)
    }

    fn create_pipeline(&self, descriptor: &PipelineDescriptor) -> Result<PipelineId, ResourceError> {
        let profile = self.internal.profile;
        descriptor.validate(profile.capabilities().max_vertex_bindings)?;

        let program = u32::try_from(descriptor.program.0)
            .ok()
            .and_then(NonZeroU32::new)
            .map(GlProgram)
            .ok_or(PipelineError::InvalidShaderProgram(descriptor.program))?;

        let uniforms = match descriptor.layout {
            Some(layout) => {
                self.internal
                    .layouts
                    .get(layout)
                    .ok_or(PipelineError::UnknownResourceLayout(layout))?
                    .uniforms
                    .clone()
            }
            None => Arc::from(Vec::new()),
        };

        let vertex_buffers: Vec<VertexBufferLayout> = descriptor.vertex_buffers.to_vec();
        let (vertex_array, owns_vertex_array) = if descriptor.has_vertex_inputs() {
            let layouts = vertex_buffers.clone();
            let vao = self
                .internal
                .context
                .run(move |gl| create_vertex_array(gl, profile, &layouts))
                .map_err(backend_error)?
                .map_err(backend_error)?;
            (Some(vao), true)
        } else {
            (Some(self.internal.placeholder_vertex_array), false)
        };

        let id = self.internal.pipelines.generate_id(PipelineId);
        self.internal.pipelines.insert(
            id,
            GlPipelineEntry {
                program,
                vertex_array,
                owns_vertex_array,
                mode: descriptor.fixed_function.primitive.topology.into_gl(),
                vertex_buffers,
                uniforms,
                fixed_function: descriptor.fixed_function,
            },
        );
        log::debug!(
            "Created pipeline {:?} (label: {:?}).",
            id,
            descriptor.label
        );
        Ok(id)
    }

    fn destroy_pipeline(&self, id: PipelineId) -> Result<(), ResourceError> {
        let entry = self
            .internal
            .pipelines
            .remove(id)
            .ok_or(ResourceError::NotFound)?;
        if let (true, Some(vao)) = (entry.owns_vertex_array, entry.vertex_array) {
            self.internal
                .context
                .post(move |gl| gl.issue(GlCall::DeleteVertexArray(vao)))
                .map_err(backend_error)?;
        }
        Ok(())
    }

    fn create_render_pass(
        &self,
        descriptor: &RenderPassDescriptor,
    ) -> Result<RenderPassId, ResourceError> {
        let presenting = descriptor
            .color_attachments
            .iter()
            .filter(|attachment| attachment.present)
            .count();
        if presenting > 1 {
            return Err(ResourceError::InvalidDescriptor(
                "a render pass can present at most one color attachment".to_owned(),
            ));
        }

        let id = self.internal.render_passes.generate_id(RenderPassId);
        self.internal.render_passes.insert(
            id,
            GlRenderPassEntry {
                color: descriptor.color_attachments.to_vec(),
                depth: descriptor.depth_attachment,
            },
        );
        Ok(id)
    }

    fn destroy_render_pass(&self, id: RenderPassId) -> Result<(), ResourceError> {
        self.internal
            .render_passes
            .remove(id)
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn create_frame_buffer(
        &self,
        descriptor: &FrameBufferDescriptor,
    ) -> Result<FrameBufferId, ResourceError> {
        let render_pass = self
            .internal
            .render_passes
            .get(descriptor.render_pass)
            .ok_or(ResourceError::NotFound)?;
        if descriptor.extent.is_empty() {
            return Err(ResourceError::InvalidDescriptor(
                "a frame buffer cannot be zero-sized".to_owned(),
            ));
        }

        let target = match descriptor.target {
            None => None,
            Some(NativeFrameBuffer(name)) => {
                if render_pass.color.iter().any(|attachment| attachment.present) {
                    return Err(ResourceError::InvalidDescriptor(
                        "presenting render passes can only target the default framebuffer"
                            .to_owned(),
                    ));
                }
                let name = u32::try_from(name)
                    .ok()
                    .and_then(NonZeroU32::new)
                    .ok_or_else(|| {
                        ResourceError::InvalidDescriptor(format!(
                            "{name} is not a framebuffer object name"
                        ))
                    })?;
                Some(GlFramebuffer(name))
            }
        };

        let id = self.internal.frame_buffers.generate_id(FrameBufferId);
        self.internal.frame_buffers.insert(
            id,
            GlFrameBufferEntry {
                render_pass,
                target,
                extent: descriptor.extent,
            },
        );
        Ok(id)
    }

    fn destroy_frame_buffer(&self, id: FrameBufferId) -> Result<(), ResourceError> {
        self.internal
            .frame_buffers
            .remove(id)
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn command_processor_count(&self) -> usize {
        self.internal.settings.command_processors
    }

    fn command_processor(&self, index: usize) -> Option<Arc<dyn CommandProcessor>> {
        self.gl_command_processor(index)
            .map(|processor| Arc::new(processor) as Arc<dyn CommandProcessor>)
    }

    fn wait_idle(&self) -> Result<(), RenderError> {
        self.internal.context.wait_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_mapping() {
        assert_eq!(GlProfile::from_backend(BackendKind::GlCore), Some(GlProfile::Core));
        assert_eq!(GlProfile::from_backend(BackendKind::GlEs3), Some(GlProfile::Es3));
        assert_eq!(GlProfile::from_backend(BackendKind::Explicit), None);
    }

    #[test]
    fn test_capabilities_never_multi_bind() {
        assert!(!GlProfile::Core.capabilities().multi_bind);
        assert!(!GlProfile::Es3.capabilities().multi_bind);
        assert_eq!(GlProfile::Es3.capabilities().backend, BackendKind::GlEs3);
    }

    #[test]
    fn test_native_size_limit() {
        assert_eq!(native_size(16), Ok(16));
        assert!(native_size(u64::MAX).is_err());
    }
}
