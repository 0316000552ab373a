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

//! Self-contained native commands.
//!
//! A [`Command`] carries every value it needs, resolved at record time, so that
//! executing a command list never consults mutable shared state. Each command
//! lowers into a short, fixed sequence of [`GlCall`]s.

use super::conversions::IntoGl;
use super::native::{GlBuffer, GlCall, GlContext, GlFramebuffer, GlProgram, GlVertexArray};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use stratum_core::renderer::api::pass::{ScissorRect, Viewport};
use stratum_core::renderer::api::pipeline::{
    BlendComponent, BlendFactor, BlendOperation, ColorWrites, CompareFunction, CullMode,
    FixedFunctionState, FrontFace,
};
use stratum_core::stratum_bitflags;

stratum_bitflags! {
    /// Pieces of fixed-function state a pipeline moves away from the context default.
    pub struct StateMask: u32 {
        /// `GL_DEPTH_TEST` is enabled.
        const DEPTH_TEST = 1 << 0;
        /// The depth function is not `GL_LESS`.
        const DEPTH_FUNC = 1 << 1;
        /// Depth writes are disabled.
        const DEPTH_WRITE = 1 << 2;
        /// `GL_BLEND` is enabled.
        const BLEND = 1 << 3;
        /// Blend factors are not `ONE, ZERO`.
        const BLEND_FUNC = 1 << 4;
        /// Blend equations are not `FUNC_ADD`.
        const BLEND_EQUATION = 1 << 5;
        /// `GL_CULL_FACE` is enabled.
        const CULL = 1 << 6;
        /// The culled face is not `GL_BACK`.
        const CULL_FACE = 1 << 7;
        /// The front face is not `GL_CCW`.
        const FRONT_FACE = 1 << 8;
        /// Some color channel is write-masked.
        const COLOR_MASK = 1 << 9;
    }
}

impl StateMask {
    /// The state a pipeline touches when bound.
    pub fn touched_by(state: &FixedFunctionState) -> Self {
        let mut mask = StateMask::EMPTY;
        if let Some(depth) = state.depth {
            mask.insert(StateMask::DEPTH_TEST);
            if depth.compare != CompareFunction::default() {
                mask.insert(StateMask::DEPTH_FUNC);
            }
            if !depth.write_enabled {
                mask.insert(StateMask::DEPTH_WRITE);
            }
        }
        if let Some(blend) = state.blend {
            mask.insert(StateMask::BLEND);
            if !is_default_factors(&blend.color) || !is_default_factors(&blend.alpha) {
                mask.insert(StateMask::BLEND_FUNC);
            }
            if blend.color.operation != BlendOperation::Add
                || blend.alpha.operation != BlendOperation::Add
            {
                mask.insert(StateMask::BLEND_EQUATION);
            }
        }
        match state.primitive.cull_mode {
            CullMode::None => {}
            CullMode::Back => mask.insert(StateMask::CULL),
            CullMode::Front => mask.insert(StateMask::CULL | StateMask::CULL_FACE),
        }
        if state.primitive.front_face != FrontFace::Ccw {
            mask.insert(StateMask::FRONT_FACE);
        }
        if state.color_writes != ColorWrites::ALL {
            mask.insert(StateMask::COLOR_MASK);
        }
        mask
    }
}

fn is_default_factors(component: &BlendComponent) -> bool {
    component.src_factor == BlendFactor::One && component.dst_factor == BlendFactor::Zero
}

/// One attachment clear issued when a render pass begins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClearOp {
    /// `GL_COLOR` or `GL_DEPTH`.
    pub buffer: u32,
    /// The draw buffer index for color clears, zero for depth.
    pub draw_buffer: u32,
    /// The clear value. Depth uses the first component.
    pub values: [f32; 4],
}

/// One vertex attribute pointer, fully resolved for the embedded profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributePointer {
    pub buffer: GlBuffer,
    pub location: u32,
    pub size: i32,
    pub data_type: u32,
    pub normalized: bool,
    pub integer: bool,
    pub stride: u64,
    /// Absolute byte offset of the attribute's first element in `buffer`.
    pub offset: u64,
    pub divisor: u32,
}

/// A recorded, self-contained native command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Binds the frame buffer, sets the full viewport, and clears attachments.
    BeginRenderPass {
        framebuffer: Option<GlFramebuffer>,
        width: u32,
        height: u32,
        clears: Vec<ClearOp>,
    },
    /// Unbinds the pass's program and vertex array, then discards attachments
    /// whose contents are not stored.
    EndRenderPass {
        framebuffer: Option<GlFramebuffer>,
        invalidate: Vec<u32>,
    },
    /// Binds a program and vertex array and applies the non-default parts of
    /// the pipeline's fixed-function state.
    BindPipeline {
        program: GlProgram,
        vertex_array: Option<GlVertexArray>,
        state: FixedFunctionState,
    },
    SetViewport(Viewport),
    /// Sets the scissor box. A disabled scissor is the full-extent default.
    SetScissor { rect: ScissorRect, enabled: bool },
    /// Desktop only: one separate-format vertex buffer binding.
    BindVertexBuffer {
        binding: u32,
        buffer: GlBuffer,
        offset: u64,
        stride: u64,
    },
    /// Desktop only: binds the element buffer into the current vertex array.
    BindIndexBuffer(GlBuffer),
    /// Embedded only: every staged vertex binding and the index buffer, flushed
    /// right before a draw.
    FlushVertexBindings {
        attributes: Vec<AttributePointer>,
        index_buffer: Option<GlBuffer>,
    },
    BindUniformBuffer {
        binding: u32,
        buffer: GlBuffer,
        offset: u64,
        size: u64,
    },
    Draw {
        mode: u32,
        first: u32,
        count: u32,
        instances: u32,
    },
    /// `offset` is the byte offset of the first index in the element buffer.
    DrawIndexed {
        mode: u32,
        count: u32,
        element_type: u32,
        offset: u64,
        instances: u32,
        base_vertex: i32,
    },
    StoreData {
        buffer: GlBuffer,
        offset: u64,
        data: Vec<u8>,
    },
    CopyBuffer {
        source: GlBuffer,
        source_offset: u64,
        destination: GlBuffer,
        destination_offset: u64,
        size: u64,
    },
    /// Restores the masked fixed-function state to its context default.
    ResetFixedFunction(StateMask),
    /// Restores an indexed uniform buffer binding to nothing.
    UnbindUniformBuffer(u32),
}

impl Command {
    /// Lowers the command into native calls on `gl`.
    pub fn execute(&self, gl: &mut dyn GlContext) {
        match self {
            Command::BeginRenderPass {
                framebuffer,
                width,
                height,
                clears,
            } => {
                if framebuffer.is_some() {
                    gl.issue(GlCall::BindFramebuffer {
                        target: glow::FRAMEBUFFER,
                        framebuffer: *framebuffer,
                    });
                }
                gl.issue(GlCall::Viewport {
                    x: 0,
                    y: 0,
                    width: *width as i32,
                    height: *height as i32,
                });
                for clear in clears {
                    gl.issue(GlCall::ClearBuffer {
                        buffer: clear.buffer,
                        draw_buffer: clear.draw_buffer,
                        values: clear.values,
                    });
                }
            }
            Command::EndRenderPass {
                framebuffer,
                invalidate,
            } => {
                gl.issue(GlCall::UseProgram(None));
                gl.issue(GlCall::BindVertexArray(None));
                if !invalidate.is_empty() {
                    gl.issue(GlCall::InvalidateFramebuffer {
                        target: glow::FRAMEBUFFER,
                        attachments: Cow::Borrowed(invalidate),
                    });
                }
                if framebuffer.is_some() {
                    gl.issue(GlCall::BindFramebuffer {
                        target: glow::FRAMEBUFFER,
                        framebuffer: None,
                    });
                }
            }
            Command::BindPipeline {
                program,
                vertex_array,
                state,
            } => {
                gl.issue(GlCall::UseProgram(Some(*program)));
                gl.issue(GlCall::BindVertexArray(*vertex_array));
                apply_fixed_function(gl, state);
            }
            Command::SetViewport(viewport) => {
                gl.issue(GlCall::Viewport {
                    x: viewport.x as i32,
                    y: viewport.y as i32,
                    width: viewport.width as i32,
                    height: viewport.height as i32,
                });
                gl.issue(GlCall::DepthRange {
                    near: viewport.min_depth,
                    far: viewport.max_depth,
                });
            }
            Command::SetScissor { rect, enabled } => {
                gl.issue(if *enabled {
                    GlCall::Enable(glow::SCISSOR_TEST)
                } else {
                    GlCall::Disable(glow::SCISSOR_TEST)
                });
                gl.issue(GlCall::Scissor {
                    x: rect.x,
                    y: rect.y,
                    width: rect.width as i32,
                    height: rect.height as i32,
                });
            }
            Command::BindVertexBuffer {
                binding,
                buffer,
                offset,
                stride,
            } => gl.issue(GlCall::BindVertexBuffer {
                binding: *binding,
                buffer: Some(*buffer),
                offset: *offset as i32,
                stride: *stride as i32,
            }),
            Command::BindIndexBuffer(buffer) => gl.issue(GlCall::BindBuffer {
                target: glow::ELEMENT_ARRAY_BUFFER,
                buffer: Some(*buffer),
            }),
            Command::FlushVertexBindings {
                attributes,
                index_buffer,
            } => {
                let mut bound = None;
                for attribute in attributes {
                    if bound != Some(attribute.buffer) {
                        gl.issue(GlCall::BindBuffer {
                            target: glow::ARRAY_BUFFER,
                            buffer: Some(attribute.buffer),
                        });
                        bound = Some(attribute.buffer);
                    }
                    gl.issue(GlCall::VertexAttribPointer {
                        index: attribute.location,
                        size: attribute.size,
                        data_type: attribute.data_type,
                        normalized: attribute.normalized,
                        integer: attribute.integer,
                        stride: attribute.stride as i32,
                        offset: attribute.offset as i32,
                    });
                    gl.issue(GlCall::VertexAttribDivisor {
                        index: attribute.location,
                        divisor: attribute.divisor,
                    });
                }
                if bound.is_some() {
                    gl.issue(GlCall::BindBuffer {
                        target: glow::ARRAY_BUFFER,
                        buffer: None,
                    });
                }
                if let Some(index_buffer) = index_buffer {
                    gl.issue(GlCall::BindBuffer {
                        target: glow::ELEMENT_ARRAY_BUFFER,
                        buffer: Some(*index_buffer),
                    });
                }
            }
            Command::BindUniformBuffer {
                binding,
                buffer,
                offset,
                size,
            } => gl.issue(GlCall::BindBufferRange {
                target: glow::UNIFORM_BUFFER,
                index: *binding,
                buffer: Some(*buffer),
                offset: *offset as i32,
                size: *size as i32,
            }),
            Command::Draw {
                mode,
                first,
                count,
                instances,
            } => gl.issue(GlCall::DrawArraysInstanced {
                mode: *mode,
                first: *first as i32,
                count: *count as i32,
                instances: *instances as i32,
            }),
            Command::DrawIndexed {
                mode,
                count,
                element_type,
                offset,
                instances,
                base_vertex,
            } => {
                if *base_vertex == 0 {
                    gl.issue(GlCall::DrawElementsInstanced {
                        mode: *mode,
                        count: *count as i32,
                        element_type: *element_type,
                        offset: *offset as i32,
                        instances: *instances as i32,
                    });
                } else {
                    gl.issue(GlCall::DrawElementsInstancedBaseVertex {
                        mode: *mode,
                        count: *count as i32,
                        element_type: *element_type,
                        offset: *offset as i32,
                        instances: *instances as i32,
                        base_vertex: *base_vertex,
                    });
                }
            }
            Command::StoreData {
                buffer,
                offset,
                data,
            } => {
                gl.issue(GlCall::BindBuffer {
                    target: glow::COPY_WRITE_BUFFER,
                    buffer: Some(*buffer),
                });
                gl.issue(GlCall::BufferSubData {
                    target: glow::COPY_WRITE_BUFFER,
                    offset: *offset as i32,
                    data: Cow::Borrowed(data),
                });
                gl.issue(GlCall::BindBuffer {
                    target: glow::COPY_WRITE_BUFFER,
                    buffer: None,
                });
            }
            Command::CopyBuffer {
                source,
                source_offset,
                destination,
                destination_offset,
                size,
            } => {
                gl.issue(GlCall::BindBuffer {
                    target: glow::COPY_READ_BUFFER,
                    buffer: Some(*source),
                });
                gl.issue(GlCall::BindBuffer {
                    target: glow::COPY_WRITE_BUFFER,
                    buffer: Some(*destination),
                });
                gl.issue(GlCall::CopyBufferSubData {
                    read_target: glow::COPY_READ_BUFFER,
                    write_target: glow::COPY_WRITE_BUFFER,
                    read_offset: *source_offset as i32,
                    write_offset: *destination_offset as i32,
                    size: *size as i32,
                });
                gl.issue(GlCall::BindBuffer {
                    target: glow::COPY_READ_BUFFER,
                    buffer: None,
                });
                gl.issue(GlCall::BindBuffer {
                    target: glow::COPY_WRITE_BUFFER,
                    buffer: None,
                });
            }
            Command::ResetFixedFunction(mask) => reset_fixed_function(gl, *mask),
            Command::UnbindUniformBuffer(binding) => gl.issue(GlCall::BindBufferBase {
                target: glow::UNIFORM_BUFFER,
                index: *binding,
                buffer: None,
            }),
        }
    }
}

fn apply_fixed_function(gl: &mut dyn GlContext, state: &FixedFunctionState) {
    if let Some(depth) = state.depth {
        gl.issue(GlCall::Enable(glow::DEPTH_TEST));
        if depth.compare != CompareFunction::default() {
            gl.issue(GlCall::DepthFunc(depth.compare.into_gl()));
        }
        if !depth.write_enabled {
            gl.issue(GlCall::DepthMask(false));
        }
    }
    if let Some(blend) = state.blend {
        gl.issue(GlCall::Enable(glow::BLEND));
        if !is_default_factors(&blend.color) || !is_default_factors(&blend.alpha) {
            gl.issue(GlCall::BlendFuncSeparate {
                src_rgb: blend.color.src_factor.into_gl(),
                dst_rgb: blend.color.dst_factor.into_gl(),
                src_alpha: blend.alpha.src_factor.into_gl(),
                dst_alpha: blend.alpha.dst_factor.into_gl(),
            });
        }
        if blend.color.operation != BlendOperation::Add
            || blend.alpha.operation != BlendOperation::Add
        {
            gl.issue(GlCall::BlendEquationSeparate {
                rgb: blend.color.operation.into_gl(),
                alpha: blend.alpha.operation.into_gl(),
            });
        }
    }
    let cull: Option<u32> = state.primitive.cull_mode.into_gl();
    if let Some(face) = cull {
        gl.issue(GlCall::Enable(glow::CULL_FACE));
        if face != glow::BACK {
            gl.issue(GlCall::CullFace(face));
        }
    }
    if state.primitive.front_face != FrontFace::Ccw {
        gl.issue(GlCall::FrontFace(state.primitive.front_face.into_gl()));
    }
    if state.color_writes != ColorWrites::ALL {
        let writes = state.color_writes;
        gl.issue(GlCall::ColorMask([
            writes.contains(ColorWrites::R),
            writes.contains(ColorWrites::G),
            writes.contains(ColorWrites::B),
            writes.contains(ColorWrites::A),
        ]));
    }
}

fn reset_fixed_function(gl: &mut dyn GlContext, mask: StateMask) {
    if mask.contains(StateMask::DEPTH_TEST) {
        gl.issue(GlCall::Disable(glow::DEPTH_TEST));
    }
    if mask.contains(StateMask::DEPTH_FUNC) {
        gl.issue(GlCall::DepthFunc(glow::LESS));
    }
    if mask.contains(StateMask::DEPTH_WRITE) {
        gl.issue(GlCall::DepthMask(true));
    }
    if mask.contains(StateMask::BLEND) {
        gl.issue(GlCall::Disable(glow::BLEND));
    }
    if mask.contains(StateMask::BLEND_FUNC) {
        gl.issue(GlCall::BlendFuncSeparate {
            src_rgb: glow::ONE,
            dst_rgb: glow::ZERO,
            src_alpha: glow::ONE,
            dst_alpha: glow::ZERO,
        });
    }
    if mask.contains(StateMask::BLEND_EQUATION) {
        gl.issue(GlCall::BlendEquationSeparate {
            rgb: glow::FUNC_ADD,
            alpha: glow::FUNC_ADD,
        });
    }
    if mask.contains(StateMask::CULL) {
        gl.issue(GlCall::Disable(glow::CULL_FACE));
    }
    if mask.contains(StateMask::CULL_FACE) {
        gl.issue(GlCall::CullFace(glow::BACK));
    }
    if mask.contains(StateMask::FRONT_FACE) {
        gl.issue(GlCall::FrontFace(glow::CCW));
    }
    if mask.contains(StateMask::COLOR_MASK) {
        gl.issue(GlCall::ColorMask([true; 4]));
    }
}
