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

//! Integration tests for the guarantee that executing a command list leaves
//! the global context state as it found it.

mod common;

use common::{Scene, EXTENT};
use stratum_core::renderer::api::pass::{RenderPassBeginInfo, ScissorRect, Viewport};
use stratum_core::renderer::api::pipeline::{
    BlendComponent, BlendFactor, BlendOperation, BlendState, ColorWrites, CompareFunction,
    CullMode, DepthState, FixedFunctionState, FrontFace, PrimitiveState, PrimitiveTopology,
};
use stratum_core::renderer::api::settings::BackendKind;
use stratum_core::renderer::CommandBuffer;
use stratum_infra::graphics::gl::testing::GlStateSnapshot;
use stratum_infra::graphics::gl::{Command, StateMask};

fn everything_changed() -> FixedFunctionState {
    FixedFunctionState {
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleStrip,
            front_face: FrontFace::Cw,
            cull_mode: CullMode::Front,
        },
        depth: Some(DepthState {
            compare: CompareFunction::GreaterEqual,
            write_enabled: false,
        }),
        blend: Some(BlendState {
            color: BlendComponent {
                src_factor: BlendFactor::SrcAlpha,
                dst_factor: BlendFactor::OneMinusSrcAlpha,
                operation: BlendOperation::Subtract,
            },
            alpha: BlendComponent::REPLACE,
        }),
        color_writes: ColorWrites::R | ColorWrites::G,
    }
}

fn record_touching_everything(scene: &Scene) -> stratum_infra::graphics::gl::GlCommandBuffer {
    let mut cb = scene.command_buffer();
    cb.begin().unwrap();
    cb.begin_render_pass(&RenderPassBeginInfo::new(scene.frame_buffer))
        .unwrap();
    cb.bind_pipeline(scene.pipeline).unwrap();
    cb.set_viewport(Viewport {
        x: 10.0,
        y: 20.0,
        width: 100.0,
        height: 50.0,
        min_depth: 0.25,
        max_depth: 0.75,
    })
    .unwrap();
    cb.set_scissor(ScissorRect {
        x: 5,
        y: 5,
        width: 30,
        height: 30,
    })
    .unwrap();
    cb.bind_uniform_buffer(1, scene.uniforms, 0, 64).unwrap();
    cb.bind_vertex_buffer(0, scene.vertices, 0).unwrap();
    cb.draw(4, 0).unwrap();
    cb.end_render_pass().unwrap();
    cb.end().unwrap();
    cb
}

#[test]
fn test_context_state_is_restored_after_execution() {
    for backend in [BackendKind::GlCore, BackendKind::GlEs3] {
        let scene = Scene::with_state(backend, everything_changed());
        let initial = scene.log.snapshot();
        assert_eq!(initial, GlStateSnapshot::initial(EXTENT));

        let mut cb = record_touching_everything(&scene);
        scene.run(&mut cb);

        assert_eq!(scene.log.draw_calls().len(), 1, "{backend:?}");
        assert_eq!(scene.log.snapshot(), initial, "{backend:?}");
    }
}

#[test]
fn test_restore_commands_run_once_each() {
    let scene = Scene::with_state(BackendKind::GlCore, everything_changed());
    let cb = record_touching_everything(&scene);
    let commands = cb.command_list().commands();

    let end = commands.len() - 1;
    let restore = &commands[end - 4..end];
    let mask = StateMask::touched_by(&everything_changed());
    assert_eq!(mask, StateMask::from_bits_truncate((1 << 10) - 1));
    assert!(restore.contains(&Command::ResetFixedFunction(mask)));
    assert!(restore.contains(&Command::SetViewport(Viewport::full(EXTENT))));
    assert!(restore.contains(&Command::SetScissor {
        rect: ScissorRect::full(EXTENT),
        enabled: false,
    }));
    assert!(restore.contains(&Command::UnbindUniformBuffer(1)));
    assert!(matches!(commands[end], Command::EndRenderPass { .. }));
}

#[test]
fn test_pipeline_switch_restores_before_the_next_bind() {
    let scene = Scene::with_state(BackendKind::GlCore, everything_changed());
    let plain = common::create_pipeline(
        &scene.device,
        vec![common::position_layout(0)],
        None,
        FixedFunctionState::default(),
    );

    let mut cb = scene.command_buffer();
    cb.begin().unwrap();
    cb.begin_render_pass(&RenderPassBeginInfo::new(scene.frame_buffer))
        .unwrap();
    cb.bind_pipeline(scene.pipeline).unwrap();
    cb.bind_uniform_buffer(1, scene.uniforms, 0, 64).unwrap();
    cb.bind_pipeline(plain).unwrap();

    let commands = cb.command_list().commands();
    let binds: Vec<usize> = commands
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Command::BindPipeline { .. }))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(binds.len(), 2);
    let between = &commands[binds[0]..binds[1]];
    assert!(between
        .iter()
        .any(|c| matches!(c, Command::ResetFixedFunction(_))));
    assert!(between.contains(&Command::UnbindUniformBuffer(1)));
    assert!(cb.command_list().pending_restore().is_empty());

    // The default pipeline leaves nothing to restore, so only the pass end remains.
    cb.end_render_pass().unwrap();
    let commands = cb.command_list().commands();
    assert!(matches!(
        commands[commands.len() - 1],
        Command::EndRenderPass { .. }
    ));
    assert!(matches!(
        commands[commands.len() - 2],
        Command::SetScissor { enabled: false, .. }
    ));
}

#[test]
fn test_untouched_state_is_not_restored() {
    let scene = Scene::new(BackendKind::GlCore);
    let mut cb = scene.command_buffer();
    cb.begin().unwrap();
    cb.begin_render_pass(&RenderPassBeginInfo::new(scene.frame_buffer))
        .unwrap();
    cb.bind_pipeline(scene.pipeline).unwrap();
    cb.end_render_pass().unwrap();

    assert!(!cb
        .command_list()
        .commands()
        .iter()
        .any(|c| matches!(c, Command::ResetFixedFunction(_) | Command::UnbindUniformBuffer(_))));
}
