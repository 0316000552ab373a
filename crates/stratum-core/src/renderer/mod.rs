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

//! Provides the public, backend-agnostic rendering contracts for Stratum.
//!
//! This module defines the "common language" of the graphics layer. It contains
//! the abstract `traits` (like [`CommandBuffer`] and [`GraphicsDevice`]), data
//! structures (like [`BufferDescriptor`] and [`PipelineDescriptor`]), and the
//! error types that form the stable, public-facing API.
//!
//! This module defines the 'what' of rendering, while the 'how' is handled by a
//! concrete backend in the `stratum-infra` crate (e.g. the OpenGL Core and
//! OpenGL ES 3.0 backends) which implements these traits.

pub mod api;
pub mod error;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{
    ArgumentError, PipelineError, RecordError, RenderError, ResourceError, StateError,
};
pub use self::traits::{CommandBuffer, CommandProcessor, GraphicsDevice, PresentationSurface};
