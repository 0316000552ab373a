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

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use stratum_core::math::Extent2D;
use stratum_core::renderer::api::command::SubmissionFence;
use stratum_core::renderer::api::pass::{FrameBufferId, RenderPassId};
use stratum_core::renderer::traits::{Frame, PresentationSurface};
use stratum_core::renderer::RenderError;

use super::device::GlDevice;
use super::recorder::GlCommandBuffer;
use super::resources::lock;

/// A presentation surface over the default framebuffer.
///
/// At most `frames_in_flight` presented frames may still be executing when a
/// new one is acquired.
#[derive(Debug)]
pub struct GlSurface {
    device: GlDevice,
    render_pass: RenderPassId,
    frame_buffer: FrameBufferId,
    extent: Mutex<Extent2D>,
    in_flight: Mutex<VecDeque<SubmissionFence>>,
    frame_counter: AtomicU64,
}

impl GlSurface {
    pub(crate) fn new(
        device: GlDevice,
        render_pass: RenderPassId,
        frame_buffer: FrameBufferId,
        extent: Extent2D,
    ) -> Self {
        Self {
            device,
            render_pass,
            frame_buffer,
            extent: Mutex::new(extent),
            in_flight: Mutex::new(VecDeque::new()),
            frame_counter: AtomicU64::new(0),
        }
    }

    /// The render pass frames are recorded against.
    pub fn render_pass(&self) -> RenderPassId {
        self.render_pass
    }

    /// The frame buffer targeting the surface.
    pub fn frame_buffer(&self) -> FrameBufferId {
        self.frame_buffer
    }

    /// The number of presented frames that have not finished executing.
    pub fn frames_in_flight(&self) -> usize {
        let mut in_flight = lock(&self.in_flight);
        in_flight.retain(|fence| !fence.is_complete());
        in_flight.len()
    }
}

impl PresentationSurface for GlSurface {
    fn try_begin_frame(&self) -> Option<Frame> {
        if lock(&self.extent).is_empty() {
            return None;
        }
        let limit = self.device.settings().frames_in_flight as usize;
        if self.frames_in_flight() >= limit {
            log::trace!("All {} frames are in flight.", limit);
            return None;
        }

        let index = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        Some(Frame {
            command_buffer: Box::new(GlCommandBuffer::new(self.device.clone(), 0)),
            frame_buffer: self.frame_buffer,
            index,
        })
    }

    fn present_frame(&self, mut frame: Frame) -> Result<(), RenderError> {
        let fence = frame.command_buffer.submit()?;
        self.device.swap_buffers()?;
        lock(&self.in_flight).push_back(fence);
        Ok(())
    }

    fn resize(&self, extent: Extent2D) {
        let mut current = lock(&self.extent);
        if *current == extent {
            return;
        }
        log::debug!(
            "Resizing surface from {}x{} to {}x{}.",
            current.width,
            current.height,
            extent.width,
            extent.height
        );
        *current = extent;
        if !extent.is_empty() {
            if let Err(e) = self.device.resize_frame_buffer(self.frame_buffer, extent) {
                log::error!("Failed to resize the surface frame buffer: {}", e);
            }
        }
    }

    fn extent(&self) -> Extent2D {
        *lock(&self.extent)
    }
}
