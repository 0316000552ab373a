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

//! Resource layout descriptors.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// An opaque handle to a resource layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceLayoutId(pub usize);

/// One uniform buffer binding point a pipeline reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniformBinding {
    /// The binding point (e.g. `layout(binding = 1)` in the shader).
    pub binding: u32,
    /// The minimum number of bytes a bound range must cover. Zero disables the check.
    pub min_size: u64,
}

/// A descriptor for a [`ResourceLayoutId`].
/// Defines the set of resource bindings a pipeline can access.
#[derive(Debug, Clone, Default)]
pub struct ResourceLayoutDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The uniform buffer bindings.
    pub uniform_buffers: Cow<'a, [UniformBinding]>,
}

impl ResourceLayoutDescriptor<'_> {
    /// Looks up the declaration of a binding point.
    pub fn uniform(&self, binding: u32) -> Option<&UniformBinding> {
        self.uniform_buffers.iter().find(|u| u.binding == binding)
    }
}
