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

//! Descriptors and types for render passes and frame buffers.
//!
//! A render pass describes a set of attachments and what happens to them when a
//! drawing scope begins and ends. A frame buffer binds a render pass to a
//! concrete render target and gives the scope its extent, which is also what
//! viewport and scissor fall back to whenever pipeline state is restored.

use crate::math::{Extent2D, LinearRgba};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Describes the operation to perform on an attachment at the start of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LoadOp<V> {
    /// The existing contents of the attachment will be loaded into the pass.
    Load,
    /// The attachment will be cleared to the specified value before the pass begins.
    Clear(V),
}

/// Describes the operation to perform on an attachment at the end of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StoreOp {
    /// The results of the render pass will be stored to the attachment's memory.
    #[default]
    Store,
    /// The results of the render pass will be discarded, leaving the attachment's memory undefined.
    Discard,
}

/// Defines the load and store operations for a single render pass attachment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Operations<V> {
    /// The operation to perform at the beginning of the pass.
    pub load: LoadOp<V>,
    /// The operation to perform at the end of the pass.
    pub store: StoreOp,
}

/// A description of a single color attachment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorAttachment {
    /// The load and store operations for this color attachment.
    pub ops: Operations<LinearRgba>,
    /// `true` if this attachment is the image handed to the presentation surface.
    pub present: bool,
}

/// A description of a depth attachment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthAttachment {
    /// The load and store operations for the depth aspect.
    pub ops: Operations<f32>,
}

/// A descriptor for a render pass.
#[derive(Debug, Clone, Default)]
pub struct RenderPassDescriptor<'a> {
    /// An optional debug label for the render pass.
    pub label: Option<Cow<'a, str>>,
    /// The color attachments used in the pass.
    pub color_attachments: Cow<'a, [ColorAttachment]>,
    /// An optional depth attachment for this pass.
    pub depth_attachment: Option<DepthAttachment>,
}

impl RenderPassDescriptor<'_> {
    /// A single presentable color attachment cleared to `color` and stored.
    pub fn present(color: LinearRgba) -> Self {
        Self {
            label: None,
            color_attachments: Cow::Owned(vec![ColorAttachment {
                ops: Operations {
                    load: LoadOp::Clear(color),
                    store: StoreOp::Store,
                },
                present: true,
            }]),
            depth_attachment: None,
        }
    }

    /// The number of attachments, color attachments first.
    pub fn attachment_count(&self) -> usize {
        self.color_attachments.len() + usize::from(self.depth_attachment.is_some())
    }
}

/// An opaque handle to a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderPassId(pub usize);

/// A backend-specific render target handle (for OpenGL, a framebuffer object name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeFrameBuffer(pub u64);

/// A descriptor for a frame buffer.
#[derive(Debug, Clone)]
pub struct FrameBufferDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The render pass this frame buffer is compatible with.
    pub render_pass: RenderPassId,
    /// The render target. `None` targets the presentation surface.
    pub target: Option<NativeFrameBuffer>,
    /// The size of every attachment.
    pub extent: Extent2D,
}

/// An opaque handle to a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameBufferId(pub usize);

/// A value used to clear one attachment, overriding the render pass default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClearValue {
    /// Clear color for a color attachment.
    Color(LinearRgba),
    /// Clear depth for a depth attachment.
    Depth(f32),
}

/// Everything needed to begin a render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPassBeginInfo<'a> {
    /// The frame buffer to render into.
    pub frame_buffer: FrameBufferId,
    /// Per-attachment clear values, color attachments first. Empty keeps the
    /// values declared in the render pass.
    pub clear_values: &'a [ClearValue],
}

impl<'a> RenderPassBeginInfo<'a> {
    /// Begins a pass on `frame_buffer` with the render pass's declared clear values.
    pub fn new(frame_buffer: FrameBufferId) -> Self {
        Self {
            frame_buffer,
            clear_values: &[],
        }
    }

    /// Overrides the clear values.
    pub fn with_clear_values(mut self, clear_values: &'a [ClearValue]) -> Self {
        self.clear_values = clear_values;
        self
    }
}

/// The viewport transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Bottom edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Depth range near value.
    pub min_depth: f32,
    /// Depth range far value.
    pub max_depth: f32,
}

impl Viewport {
    /// A viewport covering the whole of `extent` with the full depth range.
    pub fn full(extent: Extent2D) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// A scissor rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScissorRect {
    /// Left edge.
    pub x: i32,
    /// Bottom edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl ScissorRect {
    /// A scissor covering the whole of `extent`.
    pub fn full(extent: Extent2D) -> Self {
        Self {
            x: 0,
            y: 0,
            width: extent.width,
            height: extent.height,
        }
    }
}
