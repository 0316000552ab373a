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

//! A [`GlContext`] that records calls instead of issuing them.
//!
//! Besides the call log it keeps a [`GlStateSnapshot`] of the global context
//! state, updated the way a real context would be, so tests can compare the
//! state before and after a command list executes.

use super::device::GlDevice;
use super::native::{GlBuffer, GlCall, GlContext, GlFramebuffer, GlProgram, GlVertexArray};
use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use stratum_core::math::Extent2D;
use stratum_core::renderer::api::settings::DeviceSettings;
use stratum_core::renderer::RenderError;

/// The global (non vertex array) state of a context.
#[derive(Debug, Clone, PartialEq)]
pub struct GlStateSnapshot {
    pub enabled: BTreeSet<u32>,
    pub viewport: [i32; 4],
    pub depth_range: [f32; 2],
    pub scissor: [i32; 4],
    pub depth_func: u32,
    pub depth_mask: bool,
    pub blend_func: [u32; 4],
    pub blend_equation: [u32; 2],
    pub cull_face: u32,
    pub front_face: u32,
    pub color_mask: [bool; 4],
    pub program: Option<GlProgram>,
    pub vertex_array: Option<GlVertexArray>,
    pub framebuffer: Option<GlFramebuffer>,
    /// Generic buffer bindings by target, excluding element arrays.
    pub buffers: BTreeMap<u32, GlBuffer>,
    /// Indexed uniform buffer bindings.
    pub uniform_buffers: BTreeMap<u32, GlBuffer>,
}

impl GlStateSnapshot {
    /// The state of a freshly created context on a window of `extent`.
    pub fn initial(extent: Extent2D) -> Self {
        let size = [0, 0, extent.width as i32, extent.height as i32];
        Self {
            enabled: BTreeSet::new(),
            viewport: size,
            depth_range: [0.0, 1.0],
            scissor: size,
            depth_func: glow::LESS,
            depth_mask: true,
            blend_func: [glow::ONE, glow::ZERO, glow::ONE, glow::ZERO],
            blend_equation: [glow::FUNC_ADD, glow::FUNC_ADD],
            cull_face: glow::BACK,
            front_face: glow::CCW,
            color_mask: [true; 4],
            program: None,
            vertex_array: None,
            framebuffer: None,
            buffers: BTreeMap::new(),
            uniform_buffers: BTreeMap::new(),
        }
    }

    fn bind(map: &mut BTreeMap<u32, GlBuffer>, key: u32, buffer: Option<GlBuffer>) {
        match buffer {
            Some(buffer) => map.insert(key, buffer),
            None => map.remove(&key),
        };
    }

    fn apply(&mut self, call: &GlCall<'_>) {
        match call {
            GlCall::Enable(cap) => {
                self.enabled.insert(*cap);
            }
            GlCall::Disable(cap) => {
                self.enabled.remove(cap);
            }
            GlCall::Viewport {
                x,
                y,
                width,
                height,
            } => self.viewport = [*x, *y, *width, *height],
            GlCall::DepthRange { near, far } => self.depth_range = [*near, *far],
            GlCall::Scissor {
                x,
                y,
                width,
                height,
            } => self.scissor = [*x, *y, *width, *height],
            GlCall::DepthFunc(func) => self.depth_func = *func,
            GlCall::DepthMask(mask) => self.depth_mask = *mask,
            GlCall::BlendFuncSeparate {
                src_rgb,
                dst_rgb,
                src_alpha,
                dst_alpha,
            } => self.blend_func = [*src_rgb, *dst_rgb, *src_alpha, *dst_alpha],
            GlCall::BlendEquationSeparate { rgb, alpha } => self.blend_equation = [*rgb, *alpha],
            GlCall::CullFace(face) => self.cull_face = *face,
            GlCall::FrontFace(face) => self.front_face = *face,
            GlCall::ColorMask(mask) => self.color_mask = *mask,
            GlCall::UseProgram(program) => self.program = *program,
            GlCall::BindVertexArray(vao) => self.vertex_array = *vao,
            GlCall::BindBuffer { target, buffer } => {
                if *target != glow::ELEMENT_ARRAY_BUFFER {
                    Self::bind(&mut self.buffers, *target, *buffer);
                }
            }
            GlCall::BindBufferBase {
                target,
                index,
                buffer,
            }
            | GlCall::BindBufferRange {
                target,
                index,
                buffer,
                ..
            } => {
                Self::bind(&mut self.buffers, *target, *buffer);
                if *target == glow::UNIFORM_BUFFER {
                    Self::bind(&mut self.uniform_buffers, *index, *buffer);
                }
            }
            GlCall::BindFramebuffer { framebuffer, .. } => self.framebuffer = *framebuffer,
            _ => {}
        }
    }
}

#[derive(Debug)]
struct LogState {
    calls: Vec<GlCall<'static>>,
    state: GlStateSnapshot,
    presents: u64,
}

/// Shared view of what a [`RecordingContext`] has seen.
#[derive(Debug, Clone)]
pub struct CallLog {
    inner: Arc<Mutex<LogState>>,
}

impl CallLog {
    pub fn new(extent: Extent2D) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LogState {
                calls: Vec::new(),
                state: GlStateSnapshot::initial(extent),
                presents: 0,
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut LogState) -> R) -> R {
        let mut guard = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }

    /// Every call recorded so far.
    pub fn calls(&self) -> Vec<GlCall<'static>> {
        self.with(|log| log.calls.clone())
    }

    /// Returns and forgets the recorded calls. The state snapshot is kept.
    pub fn take(&self) -> Vec<GlCall<'static>> {
        self.with(|log| std::mem::take(&mut log.calls))
    }

    pub fn clear(&self) {
        self.with(|log| log.calls.clear());
    }

    /// The draw calls recorded so far.
    pub fn draw_calls(&self) -> Vec<GlCall<'static>> {
        self.with(|log| log.calls.iter().filter(|c| c.is_draw()).cloned().collect())
    }

    /// The current global state.
    pub fn snapshot(&self) -> GlStateSnapshot {
        self.with(|log| log.state.clone())
    }

    /// How many times the default framebuffer was presented.
    pub fn presents(&self) -> u64 {
        self.with(|log| log.presents)
    }
}

/// A [`GlContext`] that appends every call to a [`CallLog`].
#[derive(Debug)]
pub struct RecordingContext {
    log: CallLog,
    last_name: u32,
    fail_allocations: bool,
}

impl RecordingContext {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            last_name: 0,
            fail_allocations: false,
        }
    }

    /// Makes every object allocation fail, as an out-of-memory context would.
    pub fn with_failing_allocations(mut self) -> Self {
        self.fail_allocations = true;
        self
    }

    fn next_name(&mut self) -> Result<NonZeroU32, String> {
        if self.fail_allocations {
            return Err("out of memory".to_owned());
        }
        self.last_name += 1;
        NonZeroU32::new(self.last_name).ok_or_else(|| "object names exhausted".to_owned())
    }
}

impl GlContext for RecordingContext {
    fn issue(&mut self, call: GlCall<'_>) {
        self.log.with(|log| {
            log.state.apply(&call);
            log.calls.push(call.into_owned());
        });
    }

    fn create_buffer(&mut self) -> Result<GlBuffer, String> {
        self.next_name().map(GlBuffer)
    }

    fn create_vertex_array(&mut self) -> Result<GlVertexArray, String> {
        self.next_name().map(GlVertexArray)
    }

    fn swap_buffers(&mut self) -> Result<(), String> {
        self.log.with(|log| log.presents += 1);
        Ok(())
    }
}

/// Creates a device whose context is a [`RecordingContext`] on a window of `extent`.
pub fn recording_device(
    settings: &DeviceSettings,
    extent: Extent2D,
) -> Result<(GlDevice, CallLog), RenderError> {
    let log = CallLog::new(extent);
    let context_log = log.clone();
    let device = crate::create_device(settings, move |_| {
        Ok(Box::new(RecordingContext::new(context_log)) as Box<dyn GlContext>)
    })?;
    Ok((device, log))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_tracks_bindings() {
        let log = CallLog::new(Extent2D::new(4, 4));
        let mut context = RecordingContext::new(log.clone());
        let buffer = context.create_buffer().unwrap();

        context.issue(GlCall::BindBufferRange {
            target: glow::UNIFORM_BUFFER,
            index: 2,
            buffer: Some(buffer),
            offset: 0,
            size: 16,
        });
        assert_eq!(log.snapshot().uniform_buffers.get(&2), Some(&buffer));

        context.issue(GlCall::BindBufferBase {
            target: glow::UNIFORM_BUFFER,
            index: 2,
            buffer: None,
        });
        assert_eq!(log.snapshot(), GlStateSnapshot::initial(Extent2D::new(4, 4)));
    }

    #[test]
    fn test_failing_allocations() {
        let mut context =
            RecordingContext::new(CallLog::new(Extent2D::new(1, 1))).with_failing_allocations();
        assert!(context.create_buffer().is_err());
    }
}
