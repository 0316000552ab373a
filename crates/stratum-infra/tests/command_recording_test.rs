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

//! Integration tests for what a recording session produces.

mod common;

use common::{Scene, EXTENT};
use stratum_core::math::LinearRgba;
use stratum_core::renderer::api::buffer::{BufferDescriptor, BufferUsage};
use stratum_core::renderer::api::command::VertexBufferBinding;
use stratum_core::renderer::api::pass::{RenderPassBeginInfo, ScissorRect, Viewport};
use stratum_core::renderer::api::pipeline::FixedFunctionState;
use stratum_core::renderer::api::settings::BackendKind;
use stratum_core::renderer::api::util::IndexFormat;
use stratum_core::renderer::{
    ArgumentError, CommandBuffer, GraphicsDevice, RecordError, StateError,
};
use stratum_infra::graphics::gl::command::ClearOp;
use stratum_infra::graphics::gl::{Command, GlCall};

// ─────────────────────────────────────────────────────────────────────────────
// Command sequences
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_single_draw_produces_the_expected_sequence() {
    let scene = Scene::new(BackendKind::GlCore);
    let mut cb = scene.command_buffer();

    cb.begin().unwrap();
    cb.begin_render_pass(&RenderPassBeginInfo::new(scene.frame_buffer))
        .unwrap();
    cb.bind_pipeline(scene.pipeline).unwrap();
    cb.bind_vertex_buffer(0, scene.vertices, 0).unwrap();
    cb.draw(4, 0).unwrap();
    cb.end_render_pass().unwrap();
    cb.end().unwrap();

    let commands = cb.command_list().commands();
    assert_eq!(commands.len(), 7, "{commands:#?}");
    assert_eq!(
        commands[0],
        Command::BeginRenderPass {
            framebuffer: None,
            width: EXTENT.width,
            height: EXTENT.height,
            clears: vec![ClearOp {
                buffer: glow::COLOR,
                draw_buffer: 0,
                values: LinearRgba::BLACK.to_array(),
            }],
        }
    );
    assert!(matches!(
        &commands[1],
        Command::BindPipeline { vertex_array: Some(_), state, .. } if *state == FixedFunctionState::default()
    ));
    assert_eq!(commands[2], Command::SetViewport(Viewport::full(EXTENT)));
    assert_eq!(
        commands[3],
        Command::SetScissor {
            rect: ScissorRect::full(EXTENT),
            enabled: false,
        }
    );
    assert!(matches!(
        commands[4],
        Command::BindVertexBuffer {
            binding: 0,
            offset: 0,
            stride: 12,
            ..
        }
    ));
    assert_eq!(
        commands[5],
        Command::Draw {
            mode: glow::TRIANGLES,
            first: 0,
            count: 4,
            instances: 1,
        }
    );
    assert_eq!(
        commands[6],
        Command::EndRenderPass {
            framebuffer: None,
            invalidate: Vec::new(),
        }
    );

    scene.run(&mut cb);
    assert_eq!(
        scene.log.draw_calls(),
        vec![GlCall::DrawArraysInstanced {
            mode: glow::TRIANGLES,
            first: 0,
            count: 4,
            instances: 1,
        }]
    );
}

#[test]
fn test_uniform_binding_is_restored_before_the_pass_ends() {
    let scene = Scene::new(BackendKind::GlCore);
    let mut cb = scene.command_buffer();

    cb.begin().unwrap();
    cb.begin_render_pass(&RenderPassBeginInfo::new(scene.frame_buffer))
        .unwrap();
    cb.bind_pipeline(scene.pipeline).unwrap();
    cb.bind_uniform_buffer(1, scene.uniforms, 0, 64).unwrap();
    cb.bind_uniform_buffer(1, scene.uniforms, 64, 64).unwrap();
    cb.end_render_pass().unwrap();

    let commands = cb.command_list().commands();
    let unbinds: Vec<_> = commands
        .iter()
        .filter(|c| matches!(c, Command::UnbindUniformBuffer(_)))
        .collect();
    assert_eq!(unbinds, vec![&Command::UnbindUniformBuffer(1)]);
    assert_eq!(
        commands[commands.len() - 2],
        Command::UnbindUniformBuffer(1)
    );
}

#[test]
fn test_indexed_draw_offset_uses_index_width() {
    for backend in [BackendKind::GlCore, BackendKind::GlEs3] {
        let scene = Scene::new(backend);
        let indices = scene
            .device
            .create_buffer_with_data(
                &BufferDescriptor::mappable(64, BufferUsage::INDEX),
                &[0u8; 64],
            )
            .unwrap();
        let mut cb = scene.command_buffer();

        cb.begin().unwrap();
        cb.begin_render_pass(&RenderPassBeginInfo::new(scene.frame_buffer))
            .unwrap();
        cb.bind_pipeline(scene.pipeline).unwrap();
        cb.bind_vertex_buffer(0, scene.vertices, 0).unwrap();
        cb.bind_index_buffer(indices, 8, IndexFormat::Uint16).unwrap();
        cb.draw_indexed_instanced(6, 3, 0, 2).unwrap();
        cb.bind_index_buffer(indices, 0, IndexFormat::Uint32).unwrap();
        cb.draw_indexed(3, 2).unwrap();
        cb.end_render_pass().unwrap();

        let draws: Vec<_> = cb
            .command_list()
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::DrawIndexed {
                    count,
                    element_type,
                    offset,
                    instances,
                    ..
                } => Some((*count, *element_type, *offset, *instances)),
                _ => None,
            })
            .collect();
        assert_eq!(
            draws,
            vec![
                (6, glow::UNSIGNED_SHORT, 3 * 2 + 8, 2),
                (3, glow::UNSIGNED_INT, 2 * 4, 1),
            ],
            "{backend:?}"
        );
    }
}

#[test]
fn test_index_buffer_offset_must_be_aligned() {
    let scene = Scene::new(BackendKind::GlCore);
    let indices = scene
        .device
        .create_buffer_with_data(
            &BufferDescriptor::mappable(64, BufferUsage::INDEX),
            &[0u8; 64],
        )
        .unwrap();
    let mut cb = scene.command_buffer();

    cb.begin().unwrap();
    cb.begin_render_pass(&RenderPassBeginInfo::new(scene.frame_buffer))
        .unwrap();
    cb.bind_pipeline(scene.pipeline).unwrap();
    assert_eq!(
        cb.bind_index_buffer(indices, 3, IndexFormat::Uint16),
        Err(RecordError::Argument(ArgumentError::IndexOffsetAlignment {
            offset: 3,
            alignment: 2,
        }))
    );
    assert_eq!(
        cb.bind_index_buffer(indices, 6, IndexFormat::Uint32),
        Err(RecordError::Argument(ArgumentError::IndexOffsetAlignment {
            offset: 6,
            alignment: 4,
        }))
    );
    cb.bind_index_buffer(indices, 6, IndexFormat::Uint16).unwrap();
}

#[test]
fn test_multi_bind_is_a_sequence_of_single_binds() {
    let scene = Scene::new(BackendKind::GlCore);
    let pipeline = common::create_pipeline(
        &scene.device,
        vec![common::position_layout(0), common::position_layout(1)],
        None,
        FixedFunctionState::default(),
    );
    let mut cb = scene.command_buffer();

    cb.begin().unwrap();
    cb.begin_render_pass(&RenderPassBeginInfo::new(scene.frame_buffer))
        .unwrap();
    cb.bind_pipeline(pipeline).unwrap();
    cb.bind_vertex_buffers(
        0,
        &[
            VertexBufferBinding::new(scene.vertices),
            VertexBufferBinding::with_offset(scene.vertices, 24),
        ],
    )
    .unwrap();

    let binds: Vec<_> = cb
        .command_list()
        .commands()
        .iter()
        .filter_map(|c| match c {
            Command::BindVertexBuffer {
                binding, offset, ..
            } => Some((*binding, *offset)),
            _ => None,
        })
        .collect();
    assert_eq!(binds, vec![(0, 0), (1, 24)]);
    assert!(!scene.device.capabilities().multi_bind);
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_failed_calls_record_nothing() {
    let scene = Scene::new(BackendKind::GlCore);
    let mut cb = scene.command_buffer();

    cb.begin().unwrap();
    cb.begin_render_pass(&RenderPassBeginInfo::new(scene.frame_buffer))
        .unwrap();
    cb.bind_pipeline(scene.pipeline).unwrap();
    let snapshot = cb.command_list().clone();

    assert_eq!(
        cb.bind_uniform_buffer(5, scene.uniforms, 0, 64),
        Err(RecordError::Argument(ArgumentError::BindingIndex {
            binding: 5,
            limit: 24,
        }))
    );
    assert!(matches!(
        cb.bind_uniform_buffer(1, scene.uniforms, 0, 32),
        Err(RecordError::Argument(ArgumentError::OutOfBounds { .. }))
    ));
    assert!(matches!(
        cb.bind_uniform_buffer(1, scene.uniforms, 224, 64),
        Err(RecordError::Argument(ArgumentError::OutOfBounds { .. }))
    ));
    assert_eq!(
        cb.bind_uniform_buffer(1, scene.vertices, 0, 64),
        Err(RecordError::Argument(ArgumentError::BufferUsage {
            buffer: scene.vertices,
            required: BufferUsage::UNIFORM,
        }))
    );
    assert_eq!(
        cb.draw_indexed(3, 0),
        Err(RecordError::State(StateError::MissingVertexBinding { binding: 0 }))
    );
    cb.bind_vertex_buffer(0, scene.vertices, 0).unwrap();
    let bound = cb.command_list().clone();
    assert_eq!(
        cb.draw_indexed(3, 0),
        Err(RecordError::State(StateError::NoIndexBuffer))
    );
    assert_eq!(cb.command_list(), &bound);
    assert_ne!(&snapshot, &bound);
}

#[test]
fn test_bindings_do_not_survive_a_pipeline_change() {
    let scene = Scene::new(BackendKind::GlEs3);
    let mut cb = scene.command_buffer();

    cb.begin().unwrap();
    cb.begin_render_pass(&RenderPassBeginInfo::new(scene.frame_buffer))
        .unwrap();
    cb.bind_pipeline(scene.pipeline).unwrap();
    cb.bind_vertex_buffer(0, scene.vertices, 0).unwrap();
    cb.draw(3, 0).unwrap();
    cb.bind_pipeline(scene.pipeline).unwrap();
    assert_eq!(
        cb.draw(3, 0),
        Err(RecordError::State(StateError::MissingVertexBinding { binding: 0 }))
    );
}
