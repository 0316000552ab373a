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

use crate::math::Extent2D;
use crate::renderer::api::pass::FrameBufferId;
use crate::renderer::error::RenderError;
use crate::renderer::traits::CommandBuffer;

/// One acquired frame: a fresh command buffer and the frame buffer to draw into.
pub struct Frame {
    /// A command buffer that has not begun recording yet.
    pub command_buffer: Box<dyn CommandBuffer>,
    /// The frame buffer targeting the surface image.
    pub frame_buffer: FrameBufferId,
    /// Monotonic frame counter.
    pub index: u64,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("frame_buffer", &self.frame_buffer)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// A swap-chain-like surface frames are rendered to and presented from.
pub trait PresentationSurface: Send + Sync {
    /// Acquires the next frame, or `None` if the surface cannot take one right
    /// now (zero-sized, or every frame in flight is still executing).
    fn try_begin_frame(&self) -> Option<Frame>;

    /// Submits the frame's command buffer and presents the result.
    ///
    /// The command buffer must have been ended.
    fn present_frame(&self, frame: Frame) -> Result<(), RenderError>;

    /// Informs the surface that its backing window changed size.
    fn resize(&self, extent: Extent2D);

    /// The current size of the surface.
    fn extent(&self) -> Extent2D;
}
