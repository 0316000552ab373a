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

//! The boundary between recorded commands and the native API.
//!
//! Every native entry point the backend uses is one [`GlCall`] variant. Commands
//! lower themselves into calls and hand them to a [`GlContext`]; the context is
//! either a real OpenGL context (see [`GlowContext`](super::GlowContext)) or a
//! recorder used by tests.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::num::NonZeroU32;

macro_rules! native_name {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub NonZeroU32);
    };
}

native_name!(
    /// A native buffer object name.
    GlBuffer
);
native_name!(
    /// A native vertex array object name.
    GlVertexArray
);
native_name!(
    /// A linked native program object name.
    GlProgram
);
native_name!(
    /// A native framebuffer object name. The default framebuffer is `None`.
    GlFramebuffer
);

/// One native API call.
///
/// Names and parameters follow the OpenGL entry points one to one. Offsets and
/// sizes are already converted to the native integer types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GlCall<'a> {
    Enable(u32),
    Disable(u32),
    Viewport {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    DepthRange {
        near: f32,
        far: f32,
    },
    Scissor {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    DepthFunc(u32),
    DepthMask(bool),
    BlendFuncSeparate {
        src_rgb: u32,
        dst_rgb: u32,
        src_alpha: u32,
        dst_alpha: u32,
    },
    BlendEquationSeparate {
        rgb: u32,
        alpha: u32,
    },
    CullFace(u32),
    FrontFace(u32),
    ColorMask([bool; 4]),
    UseProgram(Option<GlProgram>),
    BindVertexArray(Option<GlVertexArray>),
    BindBuffer {
        target: u32,
        buffer: Option<GlBuffer>,
    },
    BindBufferBase {
        target: u32,
        index: u32,
        buffer: Option<GlBuffer>,
    },
    BindBufferRange {
        target: u32,
        index: u32,
        buffer: Option<GlBuffer>,
        offset: i32,
        size: i32,
    },
    BindFramebuffer {
        target: u32,
        framebuffer: Option<GlFramebuffer>,
    },
    EnableVertexAttribArray(u32),
    /// Separate attribute format, desktop core profile only.
    VertexAttribFormat {
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        integer: bool,
        relative_offset: u32,
    },
    /// Separate attribute format, desktop core profile only.
    VertexAttribBinding {
        index: u32,
        binding: u32,
    },
    /// Separate attribute format, desktop core profile only.
    VertexBindingDivisor {
        binding: u32,
        divisor: u32,
    },
    /// Separate attribute format, desktop core profile only.
    BindVertexBuffer {
        binding: u32,
        buffer: Option<GlBuffer>,
        offset: i32,
        stride: i32,
    },
    VertexAttribPointer {
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        integer: bool,
        stride: i32,
        offset: i32,
    },
    VertexAttribDivisor {
        index: u32,
        divisor: u32,
    },
    ClearBuffer {
        buffer: u32,
        draw_buffer: u32,
        values: [f32; 4],
    },
    InvalidateFramebuffer {
        target: u32,
        attachments: Cow<'a, [u32]>,
    },
    DrawArraysInstanced {
        mode: u32,
        first: i32,
        count: i32,
        instances: i32,
    },
    DrawElementsInstanced {
        mode: u32,
        count: i32,
        element_type: u32,
        offset: i32,
        instances: i32,
    },
    /// Desktop core profile only.
    DrawElementsInstancedBaseVertex {
        mode: u32,
        count: i32,
        element_type: u32,
        offset: i32,
        instances: i32,
        base_vertex: i32,
    },
    BufferData {
        target: u32,
        size: i32,
        usage: u32,
    },
    BufferSubData {
        target: u32,
        offset: i32,
        data: Cow<'a, [u8]>,
    },
    CopyBufferSubData {
        read_target: u32,
        write_target: u32,
        read_offset: i32,
        write_offset: i32,
        size: i32,
    },
    DeleteBuffer(GlBuffer),
    DeleteVertexArray(GlVertexArray),
    Finish,
}

impl GlCall<'_> {
    /// Detaches the call from any borrowed data.
    pub fn into_owned(self) -> GlCall<'static> {
        match self {
            GlCall::InvalidateFramebuffer {
                target,
                attachments,
            } => GlCall::InvalidateFramebuffer {
                target,
                attachments: Cow::Owned(attachments.into_owned()),
            },
            GlCall::BufferSubData {
                target,
                offset,
                data,
            } => GlCall::BufferSubData {
                target,
                offset,
                data: Cow::Owned(data.into_owned()),
            },
            GlCall::Enable(cap) => GlCall::Enable(cap),
            GlCall::Disable(cap) => GlCall::Disable(cap),
            GlCall::Viewport {
                x,
                y,
                width,
                height,
            } => GlCall::Viewport {
                x,
                y,
                width,
                height,
            },
            GlCall::DepthRange { near, far } => GlCall::DepthRange { near, far },
            GlCall::Scissor {
                x,
                y,
                width,
                height,
            } => GlCall::Scissor {
                x,
                y,
                width,
                height,
            },
            GlCall::DepthFunc(func) => GlCall::DepthFunc(func),
            GlCall::DepthMask(mask) => GlCall::DepthMask(mask),
            GlCall::BlendFuncSeparate {
                src_rgb,
                dst_rgb,
                src_alpha,
                dst_alpha,
            } => GlCall::BlendFuncSeparate {
                src_rgb,
                dst_rgb,
                src_alpha,
                dst_alpha,
            },
            GlCall::BlendEquationSeparate { rgb, alpha } => {
                GlCall::BlendEquationSeparate { rgb, alpha }
            }
            GlCall::CullFace(face) => GlCall::CullFace(face),
            GlCall::FrontFace(face) => GlCall::FrontFace(face),
            GlCall::ColorMask(mask) => GlCall::ColorMask(mask),
            GlCall::UseProgram(program) => GlCall::UseProgram(program),
            GlCall::BindVertexArray(vao) => GlCall::BindVertexArray(vao),
            GlCall::BindBuffer { target, buffer } => GlCall::BindBuffer { target, buffer },
            GlCall::BindBufferBase {
                target,
                index,
                buffer,
            } => GlCall::BindBufferBase {
                target,
                index,
                buffer,
            },
            GlCall::BindBufferRange {
                target,
                index,
                buffer,
                offset,
                size,
            } => GlCall::BindBufferRange {
                target,
                index,
                buffer,
                offset,
                size,
            },
            GlCall::BindFramebuffer {
                target,
                framebuffer,
            } => GlCall::BindFramebuffer {
                target,
                framebuffer,
            },
            GlCall::EnableVertexAttribArray(index) => GlCall::EnableVertexAttribArray(index),
            GlCall::VertexAttribFormat {
                index,
                size,
                data_type,
                normalized,
                integer,
                relative_offset,
            } => GlCall::VertexAttribFormat {
                index,
                size,
                data_type,
                normalized,
                integer,
                relative_offset,
            },
            GlCall::VertexAttribBinding { index, binding } => {
                GlCall::VertexAttribBinding { index, binding }
            }
            GlCall::VertexBindingDivisor { binding, divisor } => {
                GlCall::VertexBindingDivisor { binding, divisor }
            }
            GlCall::BindVertexBuffer {
                binding,
                buffer,
                offset,
                stride,
            } => GlCall::BindVertexBuffer {
                binding,
                buffer,
                offset,
                stride,
            },
            GlCall::VertexAttribPointer {
                index,
                size,
                data_type,
                normalized,
                integer,
                stride,
                offset,
            } => GlCall::VertexAttribPointer {
                index,
                size,
                data_type,
                normalized,
                integer,
                stride,
                offset,
            },
            GlCall::VertexAttribDivisor { index, divisor } => {
                GlCall::VertexAttribDivisor { index, divisor }
            }
            GlCall::ClearBuffer {
                buffer,
                draw_buffer,
                values,
            } => GlCall::ClearBuffer {
                buffer,
                draw_buffer,
                values,
            },
            GlCall::DrawArraysInstanced {
                mode,
                first,
                count,
                instances,
            } => GlCall::DrawArraysInstanced {
                mode,
                first,
                count,
                instances,
            },
            GlCall::DrawElementsInstanced {
                mode,
                count,
                element_type,
                offset,
                instances,
            } => GlCall::DrawElementsInstanced {
                mode,
                count,
                element_type,
                offset,
                instances,
            },
            GlCall::DrawElementsInstancedBaseVertex {
                mode,
                count,
                element_type,
                offset,
                instances,
                base_vertex,
            } => GlCall::DrawElementsInstancedBaseVertex {
                mode,
                count,
                element_type,
                offset,
                instances,
                base_vertex,
            },
            GlCall::BufferData {
                target,
                size,
                usage,
            } => GlCall::BufferData {
                target,
                size,
                usage,
            },
            GlCall::CopyBufferSubData {
                read_target,
                write_target,
                read_offset,
                write_offset,
                size,
            } => GlCall::CopyBufferSubData {
                read_target,
                write_target,
                read_offset,
                write_offset,
                size,
            },
            GlCall::DeleteBuffer(buffer) => GlCall::DeleteBuffer(buffer),
            GlCall::DeleteVertexArray(vao) => GlCall::DeleteVertexArray(vao),
            GlCall::Finish => GlCall::Finish,
        }
    }

    /// Returns `true` for the draw entry points.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            GlCall::DrawArraysInstanced { .. }
                | GlCall::DrawElementsInstanced { .. }
                | GlCall::DrawElementsInstancedBaseVertex { .. }
        )
    }
}

/// A current native context.
///
/// A context is owned by exactly one thread for its whole life; the device
/// creates it on its context thread and never moves it, so implementations need
/// not be `Send`.
pub trait GlContext {
    /// Issues one call.
    fn issue(&mut self, call: GlCall<'_>);

    /// Generates a buffer object name.
    fn create_buffer(&mut self) -> Result<GlBuffer, String>;

    /// Generates a vertex array object name.
    fn create_vertex_array(&mut self) -> Result<GlVertexArray, String>;

    /// Presents the default framebuffer.
    fn swap_buffers(&mut self) -> Result<(), String>;
}

impl<C: GlContext + ?Sized> GlContext for Box<C> {
    fn issue(&mut self, call: GlCall<'_>) {
        (**self).issue(call)
    }

    fn create_buffer(&mut self) -> Result<GlBuffer, String> {
        (**self).create_buffer()
    }

    fn create_vertex_array(&mut self) -> Result<GlVertexArray, String> {
        (**self).create_vertex_array()
    }

    fn swap_buffers(&mut self) -> Result<(), String> {
        (**self).swap_buffers()
    }
}
