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

//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::borrow::Cow;
use stratum_core::math::{Extent2D, LinearRgba};
use stratum_core::renderer::api::buffer::{BufferDescriptor, BufferId, BufferUsage};
use stratum_core::renderer::api::pass::{FrameBufferDescriptor, FrameBufferId, RenderPassDescriptor};
use stratum_core::renderer::api::pipeline::{
    FixedFunctionState, PipelineDescriptor, PipelineId, ResourceLayoutDescriptor,
    UniformBinding, VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode,
};
use stratum_core::renderer::api::settings::{BackendKind, DeviceSettings, TargetOs};
use stratum_core::renderer::api::shader::ShaderProgramId;
use stratum_core::renderer::GraphicsDevice;
use stratum_infra::graphics::gl::testing::{recording_device, CallLog};
use stratum_infra::graphics::gl::{GlCommandBuffer, GlDevice};

pub const EXTENT: Extent2D = Extent2D::new(640, 480);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn settings(backend: BackendKind) -> DeviceSettings {
    DeviceSettings {
        os: Some(TargetOs::Linux),
        validation: true,
        ..DeviceSettings::for_backend(backend)
    }
}

/// A single `Float32x3` position attribute at location 0, 12 bytes per vertex.
pub fn position_layout(binding: u32) -> VertexBufferLayout {
    VertexBufferLayout {
        binding,
        array_stride: 12,
        step_mode: VertexStepMode::Vertex,
        attributes: vec![VertexAttribute {
            shader_location: binding,
            format: VertexFormat::Float32x3,
            offset: 0,
        }],
    }
}

/// A device, a presenting frame buffer on the default framebuffer, a pipeline
/// reading positions from binding 0 and a uniform block from binding 1, and a
/// host-written vertex buffer of four vertices.
pub struct Scene {
    pub device: GlDevice,
    pub log: CallLog,
    pub frame_buffer: FrameBufferId,
    pub pipeline: PipelineId,
    pub vertices: BufferId,
    pub uniforms: BufferId,
}

impl Scene {
    pub fn new(backend: BackendKind) -> Self {
        Self::with_state(backend, FixedFunctionState::default())
    }

    pub fn with_state(backend: BackendKind, fixed_function: FixedFunctionState) -> Self {
        init_logging();
        let (device, log) = recording_device(&settings(backend), EXTENT).unwrap();

        let render_pass = device
            .create_render_pass(&RenderPassDescriptor::present(LinearRgba::BLACK))
            .unwrap();
        let frame_buffer = device
            .create_frame_buffer(&FrameBufferDescriptor {
                label: Some("scene".into()),
                render_pass,
                target: None,
                extent: EXTENT,
            })
            .unwrap();

        let layout = device
            .create_resource_layout(&ResourceLayoutDescriptor {
                label: None,
                uniform_buffers: Cow::Owned(vec![UniformBinding {
                    binding: 1,
                    min_size: 64,
                }]),
            })
            .unwrap();
        let pipeline = create_pipeline(&device, vec![position_layout(0)], Some(layout), fixed_function);

        let vertices = device
            .create_buffer_with_data(
                &BufferDescriptor::mappable(48, BufferUsage::VERTEX),
                &[0u8; 48],
            )
            .unwrap();
        let uniforms = device
            .create_buffer(&BufferDescriptor::mappable(256, BufferUsage::UNIFORM))
            .unwrap();

        // Setup traffic is not what the tests look at.
        device.wait_idle().unwrap();
        log.clear();

        Self {
            device,
            log,
            frame_buffer,
            pipeline,
            vertices,
            uniforms,
        }
    }

    pub fn command_buffer(&self) -> GlCommandBuffer {
        self.device.gl_command_processor(0).unwrap().command_buffer()
    }

    /// Submits `command_buffer` and waits for it to execute.
    pub fn run(&self, command_buffer: &mut GlCommandBuffer) {
        use stratum_core::renderer::CommandBuffer;
        command_buffer.submit().unwrap().wait().unwrap();
    }
}

pub fn create_pipeline(
    device: &GlDevice,
    vertex_buffers: Vec<VertexBufferLayout>,
    layout: Option<stratum_core::renderer::api::pipeline::ResourceLayoutId>,
    fixed_function: FixedFunctionState,
) -> PipelineId {
    device
        .create_pipeline(&PipelineDescriptor {
            label: None,
            program: ShaderProgramId(42),
            layout,
            vertex_buffers: Cow::Owned(vertex_buffers),
            fixed_function,
        })
        .unwrap()
}
