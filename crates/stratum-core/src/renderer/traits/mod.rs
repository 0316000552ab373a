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

//! Defines the core architectural traits for the rendering subsystem.
//!
//! This module contains the fundamental contracts that decouple client code from
//! any specific graphics backend.
//!
//! - [`CommandBuffer`]: The explicit, Vulkan-like recording contract.
//! - [`CommandProcessor`]: Hands out command buffers and executes what they record.
//! - [`GraphicsDevice`]: The main interface for creating and managing resources.
//! - [`PresentationSurface`]: Frame acquisition and presentation.

mod command_buffer;
mod graphics_device;
mod surface;

pub use self::command_buffer::*;
pub use self::graphics_device::GraphicsDevice;
pub use self::surface::*;
