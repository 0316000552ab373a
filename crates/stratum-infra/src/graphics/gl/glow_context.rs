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

use super::native::{GlBuffer, GlCall, GlContext, GlFramebuffer, GlProgram, GlVertexArray};
use glow::HasContext;

type SwapFn = Box<dyn FnMut() -> Result<(), String>>;

/// A [`GlContext`] issuing calls on a real OpenGL or OpenGL ES context.
///
/// Created inside the context factory handed to
/// [`create_device`](crate::create_device), on the thread the context is
/// current on.
pub struct GlowContext {
    gl: glow::Context,
    swap: Option<SwapFn>,
}

impl GlowContext {
    pub fn new(gl: glow::Context) -> Self {
        Self { gl, swap: None }
    }

    /// Sets the platform call that presents the default framebuffer.
    pub fn with_swap(mut self, swap: impl FnMut() -> Result<(), String> + 'static) -> Self {
        self.swap = Some(Box::new(swap));
        self
    }

    /// Provides access to the underlying `glow::Context`.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }
}

fn buffer(name: Option<GlBuffer>) -> Option<glow::NativeBuffer> {
    name.map(|b| glow::NativeBuffer(b.0))
}

fn vertex_array(name: Option<GlVertexArray>) -> Option<glow::NativeVertexArray> {
    name.map(|v| glow::NativeVertexArray(v.0))
}

fn program(name: Option<GlProgram>) -> Option<glow::NativeProgram> {
    name.map(|p| glow::NativeProgram(p.0))
}

fn framebuffer(name: Option<GlFramebuffer>) -> Option<glow::NativeFramebuffer> {
    name.map(|f| glow::NativeFramebuffer(f.0))
}

impl GlContext for GlowContext {
    fn issue(&mut self, call: GlCall<'_>) {
        let gl = &self.gl;
        // SAFETY: the context is current on this thread and every name passed
        // to it was generated by it.
        unsafe {
            match call {
                GlCall::Enable(cap) => gl.enable(cap),
                GlCall::Disable(cap) => gl.disable(cap),
                GlCall::Viewport {
                    x,
                    y,
                    width,
                    height,
                } => gl.viewport(x, y, width, height),
                GlCall::DepthRange { near, far } => gl.depth_range_f32(near, far),
                GlCall::Scissor {
                    x,
                    y,
                    width,
                    height,
                } => gl.scissor(x, y, width, height),
                GlCall::DepthFunc(func) => gl.depth_func(func),
                GlCall::DepthMask(mask) => gl.depth_mask(mask),
                GlCall::BlendFuncSeparate {
                    src_rgb,
                    dst_rgb,
                    src_alpha,
                    dst_alpha,
                } => gl.blend_func_separate(src_rgb, dst_rgb, src_alpha, dst_alpha),
                GlCall::BlendEquationSeparate { rgb, alpha } => {
                    gl.blend_equation_separate(rgb, alpha)
                }
                GlCall::CullFace(face) => gl.cull_face(face),
                GlCall::FrontFace(face) => gl.front_face(face),
                GlCall::ColorMask([r, g, b, a]) => gl.color_mask(r, g, b, a),
                GlCall::UseProgram(p) => gl.use_program(program(p)),
                GlCall::BindVertexArray(vao) => gl.bind_vertex_array(vertex_array(vao)),
                GlCall::BindBuffer { target, buffer: b } => gl.bind_buffer(target, buffer(b)),
                GlCall::BindBufferBase {
                    target,
                    index,
                    buffer: b,
                } => gl.bind_buffer_base(target, index, buffer(b)),
                GlCall::BindBufferRange {
                    target,
                    index,
                    buffer: b,
                    offset,
                    size,
                } => gl.bind_buffer_range(target, index, buffer(b), offset, size),
                GlCall::BindFramebuffer {
                    target,
                    framebuffer: f,
                } => gl.bind_framebuffer(target, framebuffer(f)),
                GlCall::EnableVertexAttribArray(index) => gl.enable_vertex_attrib_array(index),
                GlCall::VertexAttribFormat {
                    index,
                    size,
                    data_type,
                    normalized,
                    integer,
                    relative_offset,
                } => {
                    if integer {
                        gl.vertex_attrib_format_i32(index, size, data_type, relative_offset)
                    } else {
                        gl.vertex_attrib_format_f32(
                            index,
                            size,
                            data_type,
                            normalized,
                            relative_offset,
                        )
                    }
                }
                GlCall::VertexAttribBinding { index, binding } => {
                    gl.vertex_attrib_binding(index, binding)
                }
                GlCall::VertexBindingDivisor { binding, divisor } => {
                    gl.vertex_binding_divisor(binding, divisor)
                }
                GlCall::BindVertexBuffer {
                    binding,
                    buffer: b,
                    offset,
                    stride,
                } => gl.bind_vertex_buffer(binding, buffer(b), offset, stride),
                GlCall::VertexAttribPointer {
                    index,
                    size,
                    data_type,
                    normalized,
                    integer,
                    stride,
                    offset,
                } => {
                    if integer {
                        gl.vertex_attrib_pointer_i32(index, size, data_type, stride, offset)
                    } else {
                        gl.vertex_attrib_pointer_f32(
                            index, size, data_type, normalized, stride, offset,
                        )
                    }
                }
                GlCall::VertexAttribDivisor { index, divisor } => {
                    gl.vertex_attrib_divisor(index, divisor)
                }
                GlCall::ClearBuffer {
                    buffer: target,
                    draw_buffer,
                    values,
                } => {
                    let len = if target == glow::DEPTH { 1 } else { 4 };
                    gl.clear_buffer_f32_slice(target, draw_buffer, &values[..len])
                }
                GlCall::InvalidateFramebuffer {
                    target,
                    attachments,
                } => gl.invalidate_framebuffer(target, &attachments),
                GlCall::DrawArraysInstanced {
                    mode,
                    first,
                    count,
                    instances,
                } => gl.draw_arrays_instanced(mode, first, count, instances),
                GlCall::DrawElementsInstanced {
                    mode,
                    count,
                    element_type,
                    offset,
                    instances,
                } => gl.draw_elements_instanced(mode, count, element_type, offset, instances),
                GlCall::DrawElementsInstancedBaseVertex {
                    mode,
                    count,
                    element_type,
                    offset,
                    instances,
                    base_vertex,
                } => gl.draw_elements_instanced_base_vertex(
                    mode,
                    count,
                    element_type,
                    offset,
                    instances,
                    base_vertex,
                ),
                GlCall::BufferData {
                    target,
                    size,
                    usage,
                } => gl.buffer_data_size(target, size, usage),
                GlCall::BufferSubData {
                    target,
                    offset,
                    data,
                } => gl.buffer_sub_data_u8_slice(target, offset, &data),
                GlCall::CopyBufferSubData {
                    read_target,
                    write_target,
                    read_offset,
                    write_offset,
                    size,
                } => gl.copy_buffer_sub_data(
                    read_target,
                    write_target,
                    read_offset,
                    write_offset,
                    size,
                ),
                GlCall::DeleteBuffer(b) => gl.delete_buffer(glow::NativeBuffer(b.0)),
                GlCall::DeleteVertexArray(v) => gl.delete_vertex_array(glow::NativeVertexArray(v.0)),
                GlCall::Finish => gl.finish(),
            }
        }
    }

    fn create_buffer(&mut self) -> Result<GlBuffer, String> {
        // SAFETY: the context is current on this thread.
        unsafe { self.gl.create_buffer() }.map(|b| GlBuffer(b.0))
    }

    fn create_vertex_array(&mut self) -> Result<GlVertexArray, String> {
        // SAFETY: the context is current on this thread.
        unsafe { self.gl.create_vertex_array() }.map(|v| GlVertexArray(v.0))
    }

    fn swap_buffers(&mut self) -> Result<(), String> {
        match self.swap.as_mut() {
            Some(swap) => swap(),
            None => {
                log::trace!("No swap function set, skipping presentation.");
                Ok(())
            }
        }
    }
}
