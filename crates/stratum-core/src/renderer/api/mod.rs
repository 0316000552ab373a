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

//! Backend-agnostic rendering API.
//!
//! Organized into several logical sub-modules:
//!
//! - **[`buffer`]**: Data buffer kinds, usages, descriptors, and handles.
//! - **[`pipeline`]**: Immutable pipeline state, vertex layouts, and resource layouts.
//! - **[`pass`]**: Render passes, frame buffers, viewports, and scissors.
//! - **[`command`]**: Recording-time argument types and submission fences.
//! - **[`shader`]**: Opaque shader program handles.
//! - **[`settings`]**: Device configuration and backend selection.
//! - **[`util`]**: Small shared enums.

pub mod buffer;
pub mod command;
pub mod pass;
pub mod pipeline;
pub mod settings;
pub mod shader;
pub mod util;

pub use self::buffer::*;
pub use self::command::*;
pub use self::pass::*;
pub use self::pipeline::*;
pub use self::settings::*;
pub use self::shader::*;
pub use self::util::*;
