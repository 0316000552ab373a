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

//! The stateful OpenGL backends.
//!
//! Recording produces a [`CommandList`] of self-contained [`Command`]s; the
//! device's context thread lowers them into [`GlCall`]s on a [`GlContext`].

pub mod command;
pub mod command_list;
mod context_thread;
pub mod conversions;
mod device;
mod glow_context;
pub mod native;
mod processor;
mod recorder;
mod resources;
pub mod shadow;
mod strategy;
mod surface;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use self::command::{Command, StateMask};
pub use self::command_list::CommandList;
pub use self::context_thread::ContextFactory;
pub use self::device::{GlDevice, GlProfile};
pub use self::glow_context::GlowContext;
pub use self::native::{GlBuffer, GlCall, GlContext, GlFramebuffer, GlProgram, GlVertexArray};
pub use self::processor::GlCommandProcessor;
pub use self::recorder::GlCommandBuffer;
pub use self::shadow::ShadowPhase;
pub use self::surface::GlSurface;
