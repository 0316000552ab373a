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

//! Record-time shadow of the global state a pipeline may change.
//!
//! The native context has one global copy of the viewport, scissor,
//! fixed-function switches, and indexed uniform bindings. A command list must
//! leave all of it as it found it, so every change made while a pipeline is
//! bound registers a restore command the first time it happens. The restore
//! commands run when the pipeline is replaced or the render pass ends.

use super::command::{Command, StateMask};
use super::command_list::CommandList;
use super::native::{GlProgram, GlVertexArray};
use std::collections::BTreeSet;
use stratum_core::math::Extent2D;
use stratum_core::renderer::api::pass::{ScissorRect, Viewport};
use stratum_core::renderer::api::pipeline::FixedFunctionState;

/// Where the shadow is in its cycle.
///
/// `NoPipeline` → `PipelineBound` → `Touched`, and back to `NoPipeline` once
/// the restore list has been flushed at the end of the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowPhase {
    NoPipeline,
    /// A pipeline is bound and nothing needs restoring yet.
    PipelineBound,
    /// Global state changed and the restore list is not empty.
    Touched,
}

#[derive(Debug)]
pub(crate) struct PipelineShadow {
    phase: ShadowPhase,
    extent: Extent2D,
    viewport_touched: bool,
    scissor_touched: bool,
    uniforms: BTreeSet<u32>,
}

impl PipelineShadow {
    pub fn new() -> Self {
        Self {
            phase: ShadowPhase::NoPipeline,
            extent: Extent2D::default(),
            viewport_touched: false,
            scissor_touched: false,
            uniforms: BTreeSet::new(),
        }
    }

    pub fn phase(&self) -> ShadowPhase {
        self.phase
    }

    /// Starts tracking a render pass on a frame buffer of `extent`.
    pub fn begin_pass(&mut self, extent: Extent2D) {
        self.reset();
        self.extent = extent;
    }

    /// Records a pipeline bind, restoring the previous pipeline's state first.
    pub fn bind_pipeline(
        &mut self,
        list: &mut CommandList,
        program: GlProgram,
        vertex_array: Option<GlVertexArray>,
        state: &FixedFunctionState,
    ) {
        list.flush_restore();
        self.clear_touched();

        list.push(Command::BindPipeline {
            program,
            vertex_array,
            state: *state,
        });
        list.push(Command::SetViewport(Viewport::full(self.extent)));
        list.push(Command::SetScissor {
            rect: ScissorRect::full(self.extent),
            enabled: false,
        });

        let mask = StateMask::touched_by(state);
        if mask.is_empty() {
            self.phase = ShadowPhase::PipelineBound;
        } else {
            list.push_restore(Command::ResetFixedFunction(mask));
            self.phase = ShadowPhase::Touched;
        }
    }

    pub fn set_viewport(&mut self, list: &mut CommandList, viewport: Viewport) {
        if !self.viewport_touched {
            list.push_restore(Command::SetViewport(Viewport::full(self.extent)));
            self.viewport_touched = true;
        }
        list.push(Command::SetViewport(viewport));
        self.phase = ShadowPhase::Touched;
    }

    pub fn set_scissor(&mut self, list: &mut CommandList, rect: ScissorRect) {
        if !self.scissor_touched {
            list.push_restore(Command::SetScissor {
                rect: ScissorRect::full(self.extent),
                enabled: false,
            });
            self.scissor_touched = true;
        }
        list.push(Command::SetScissor {
            rect,
            enabled: true,
        });
        self.phase = ShadowPhase::Touched;
    }

    /// Records a uniform buffer bind. `command` must bind `binding`.
    pub fn bind_uniform(&mut self, list: &mut CommandList, binding: u32, command: Command) {
        if self.uniforms.insert(binding) {
            list.push_restore(Command::UnbindUniformBuffer(binding));
        }
        list.push(command);
        self.phase = ShadowPhase::Touched;
    }

    /// Flushes the restore list at the end of a render pass.
    pub fn end_pass(&mut self, list: &mut CommandList) {
        list.flush_restore();
        self.reset();
    }

    pub fn reset(&mut self) {
        self.phase = ShadowPhase::NoPipeline;
        self.clear_touched();
    }

    fn clear_touched(&mut self) {
        self.viewport_touched = false;
        self.scissor_touched = false;
        self.uniforms.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gl::native::GlBuffer;
    use std::num::NonZeroU32;
    use stratum_core::renderer::api::pipeline::DepthState;

    fn program() -> GlProgram {
        GlProgram(NonZeroU32::new(1).unwrap())
    }

    fn bound_shadow(list: &mut CommandList, state: &FixedFunctionState) -> PipelineShadow {
        let mut shadow = PipelineShadow::new();
        shadow.begin_pass(Extent2D::new(800, 600));
        shadow.bind_pipeline(list, program(), None, state);
        shadow
    }

    #[test]
    fn test_bind_emits_default_viewport_and_scissor() {
        let mut list = CommandList::new();
        let shadow = bound_shadow(&mut list, &FixedFunctionState::default());

        assert_eq!(shadow.phase(), ShadowPhase::PipelineBound);
        assert!(list.pending_restore().is_empty());
        assert_eq!(
            &list.commands()[1..],
            &[
                Command::SetViewport(Viewport::full(Extent2D::new(800, 600))),
                Command::SetScissor {
                    rect: ScissorRect::full(Extent2D::new(800, 600)),
                    enabled: false,
                },
            ]
        );
    }

    #[test]
    fn test_viewport_restore_is_registered_once() {
        let mut list = CommandList::new();
        let mut shadow = bound_shadow(&mut list, &FixedFunctionState::default());
        let small = Viewport {
            width: 10.0,
            height: 10.0,
            ..Viewport::full(Extent2D::new(800, 600))
        };

        shadow.set_viewport(&mut list, small);
        shadow.set_viewport(&mut list, small);

        assert_eq!(shadow.phase(), ShadowPhase::Touched);
        assert_eq!(
            list.pending_restore(),
            &[Command::SetViewport(Viewport::full(Extent2D::new(800, 600)))]
        );
    }

    #[test]
    fn test_rebinding_flushes_restore_before_next_bind() {
        let mut list = CommandList::new();
        let depth = FixedFunctionState {
            depth: Some(DepthState::default()),
            ..Default::default()
        };
        let mut shadow = bound_shadow(&mut list, &depth);
        assert_eq!(shadow.phase(), ShadowPhase::Touched);

        shadow.bind_pipeline(&mut list, program(), None, &FixedFunctionState::default());

        let reset_at = list
            .commands()
            .iter()
            .position(|c| matches!(c, Command::ResetFixedFunction(_)))
            .unwrap();
        let second_bind = list
            .commands()
            .iter()
            .rposition(|c| matches!(c, Command::BindPipeline { .. }))
            .unwrap();
        assert!(reset_at < second_bind);
        assert_eq!(shadow.phase(), ShadowPhase::PipelineBound);
    }

    #[test]
    fn test_end_pass_empties_restore_list() {
        let mut list = CommandList::new();
        let mut shadow = bound_shadow(&mut list, &FixedFunctionState::default());
        let buffer = GlBuffer(NonZeroU32::new(2).unwrap());
        shadow.bind_uniform(
            &mut list,
            3,
            Command::BindUniformBuffer {
                binding: 3,
                buffer,
                offset: 0,
                size: 64,
            },
        );

        shadow.end_pass(&mut list);

        assert!(list.pending_restore().is_empty());
        assert_eq!(
            list.commands().last(),
            Some(&Command::UnbindUniformBuffer(3))
        );
        assert_eq!(shadow.phase(), ShadowPhase::NoPipeline);
    }
}
