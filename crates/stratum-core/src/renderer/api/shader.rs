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

//! Opaque shader program handles.
//!
//! Shader compilation happens outside this layer: a compiler collaborator hands
//! over backend-ready programs, and pipelines consume them without ever
//! inspecting their contents.

use serde::{Deserialize, Serialize};

/// An opaque handle to a backend-ready shader program.
///
/// For the OpenGL backends this wraps the native program object name produced
/// by the shader compiler. Zero is never a valid program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShaderProgramId(pub u64);

impl ShaderProgramId {
    /// Returns `true` if the handle can reference a program.
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}
