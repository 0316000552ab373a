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

use super::native::{GlBuffer, GlFramebuffer, GlProgram, GlVertexArray};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use stratum_core::math::Extent2D;
use stratum_core::renderer::api::buffer::BufferInfo;
use stratum_core::renderer::api::pass::{ColorAttachment, DepthAttachment};
use stratum_core::renderer::api::pipeline::{
    FixedFunctionState, UniformBinding, VertexBufferLayout,
};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A map from opaque handles to shared, immutable entries.
pub(crate) struct Registry<K, V> {
    entries: Mutex<HashMap<K, Arc<V>>>,
    next_id: AtomicUsize,
}

impl<K: Copy + Eq + Hash, V> Registry<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(0),
        }
    }

    pub fn generate_id(&self, make: impl FnOnce(usize) -> K) -> K {
        make(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn insert(&self, id: K, entry: V) {
        lock(&self.entries).insert(id, Arc::new(entry));
    }

    pub fn get(&self, id: K) -> Option<Arc<V>> {
        lock(&self.entries).get(&id).cloned()
    }

    /// Swaps the entry of a live handle. Returns `false` if the handle is unknown.
    pub fn replace(&self, id: K, entry: V) -> bool {
        match lock(&self.entries).get_mut(&id) {
            Some(slot) => {
                *slot = Arc::new(entry);
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: K) -> Option<Arc<V>> {
        lock(&self.entries).remove(&id)
    }
}

impl<K, V> std::fmt::Debug for Registry<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("len", &lock(&self.entries).len())
            .finish()
    }
}

#[derive(Debug)]
pub(crate) struct GlBufferEntry {
    pub native: GlBuffer,
    pub info: BufferInfo,
    /// Set once a command list copying into the buffer has been submitted.
    pub uploaded: AtomicBool,
}

impl GlBufferEntry {
    pub fn is_uploaded(&self) -> bool {
        self.uploaded.load(Ordering::Acquire)
    }

    pub fn mark_uploaded(&self) {
        self.uploaded.store(true, Ordering::Release);
    }
}

#[derive(Debug)]
pub(crate) struct GlPipelineEntry {
    pub program: GlProgram,
    /// What binding the pipeline binds: its own vertex array, the device
    /// placeholder, or nothing.
    pub vertex_array: Option<GlVertexArray>,
    /// `true` if `vertex_array` was created for this pipeline.
    pub owns_vertex_array: bool,
    /// The draw mode of the pipeline's topology.
    pub mode: u32,
    pub vertex_buffers: Vec<VertexBufferLayout>,
    pub uniforms: Arc<[UniformBinding]>,
    pub fixed_function: FixedFunctionState,
}

impl GlPipelineEntry {
    pub fn vertex_buffer(&self, binding: u32) -> Option<&VertexBufferLayout> {
        self.vertex_buffers.iter().find(|l| l.binding == binding)
    }

    pub fn uniform(&self, binding: u32) -> Option<&UniformBinding> {
        self.uniforms.iter().find(|u| u.binding == binding)
    }
}

#[derive(Debug)]
pub(crate) struct GlResourceLayoutEntry {
    pub uniforms: Arc<[UniformBinding]>,
}

#[derive(Debug)]
pub(crate) struct GlRenderPassEntry {
    pub color: Vec<ColorAttachment>,
    pub depth: Option<DepthAttachment>,
}

impl GlRenderPassEntry {
    pub fn attachment_count(&self) -> usize {
        self.color.len() + usize::from(self.depth.is_some())
    }
}

#[derive(Debug)]
pub(crate) struct GlFrameBufferEntry {
    pub render_pass: Arc<GlRenderPassEntry>,
    /// `None` is the default framebuffer.
    pub target: Option<GlFramebuffer>,
    pub extent: Extent2D,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct Key(usize);

    #[test]
    fn test_registry_lifecycle() {
        let registry: Registry<Key, &'static str> = Registry::new();
        let first = registry.generate_id(Key);
        let second = registry.generate_id(Key);
        assert_ne!(first, second);

        registry.insert(first, "a");
        assert_eq!(registry.get(first).as_deref(), Some(&"a"));
        assert!(registry.get(second).is_none());

        assert!(registry.replace(first, "b"));
        assert!(!registry.replace(second, "c"));
        assert_eq!(registry.get(first).as_deref(), Some(&"b"));

        assert!(registry.remove(first).is_some());
        assert!(registry.get(first).is_none());
        assert!(registry.remove(first).is_none());
    }
}
