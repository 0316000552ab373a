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

//! Defines data structures related to data buffer resources.
//!
//! Three kinds of buffer exist, each with fixed host/device capabilities:
//!
//! - [`BufferKind::DeviceOnly`]: GPU memory the host never writes directly. Initial
//!   content arrives through a copy from a staging buffer.
//! - [`BufferKind::Mappable`]: host-visible memory, written directly by the host.
//!   Typically used for small per-frame uniform data, one per frame in flight.
//! - [`BufferKind::Staging`]: transient host-visible memory used only as the source
//!   of an upload copy.
//!
//! A device-only buffer must not be read on the device before its staging copy
//! has been recorded and submitted. The device only checks this when validation
//! is enabled; otherwise it is the caller's responsibility.

use crate::renderer::error::ResourceError;
use crate::stratum_bitflags;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

stratum_bitflags! {
    /// A set of flags describing the allowed usages of a [`BufferId`].
    pub struct BufferUsage: u32 {
        /// The buffer can be written by the host.
        const MAP_WRITE = 1 << 0;
        /// The buffer can be used as the source of a copy operation.
        const COPY_SRC = 1 << 1;
        /// The buffer can be used as the destination of a copy operation.
        const COPY_DST = 1 << 2;
        /// The buffer can be bound as a vertex buffer.
        const VERTEX = 1 << 3;
        /// The buffer can be bound as an index buffer.
        const INDEX = 1 << 4;
        /// The buffer can be bound as a uniform buffer.
        const UNIFORM = 1 << 5;
        /// Every usage a device read can go through.
        const DEVICE_READ = Self::VERTEX.bits() | Self::INDEX.bits() | Self::UNIFORM.bits();
    }
}

/// The memory class of a data buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferKind {
    /// Device-local memory, filled through a staging copy.
    DeviceOnly,
    /// Host-visible memory, written directly by the host.
    Mappable,
    /// Transient host-visible upload memory.
    Staging,
}

impl BufferKind {
    /// Usages every buffer of this kind carries regardless of its descriptor.
    pub const fn implied_usage(self) -> BufferUsage {
        match self {
            BufferKind::DeviceOnly => BufferUsage::COPY_DST,
            BufferKind::Mappable => BufferUsage::MAP_WRITE,
            BufferKind::Staging => BufferUsage::MAP_WRITE.with(BufferUsage::COPY_SRC),
        }
    }

    /// Returns `true` if the host may write the buffer's memory.
    pub const fn is_host_writable(self) -> bool {
        matches!(self, BufferKind::Mappable | BufferKind::Staging)
    }
}

/// A descriptor used to create a [`BufferId`].
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    /// An optional debug label for the buffer.
    pub label: Option<Cow<'a, str>>,
    /// The total size of the buffer in bytes.
    pub size: u64,
    /// The memory class of the buffer.
    pub kind: BufferKind,
    /// Additional usages on top of the ones implied by `kind`.
    pub usage: BufferUsage,
}

impl<'a> BufferDescriptor<'a> {
    /// Describes a device-only buffer.
    pub fn device_only(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            kind: BufferKind::DeviceOnly,
            usage,
        }
    }

    /// Describes a host-writable buffer.
    pub fn mappable(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            kind: BufferKind::Mappable,
            usage,
        }
    }

    /// Describes a staging buffer.
    pub fn staging(size: u64) -> Self {
        Self {
            label: None,
            size,
            kind: BufferKind::Staging,
            usage: BufferUsage::EMPTY,
        }
    }

    /// Attaches a debug label.
    pub fn with_label(mut self, label: impl Into<Cow<'a, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The full usage set: the requested usages plus those implied by the kind.
    pub fn resolved_usage(&self) -> BufferUsage {
        self.usage | self.kind.implied_usage()
    }

    /// Checks the descriptor for combinations no backend can honour.
    pub fn validate(&self) -> Result<(), ResourceError> {
        if self.size == 0 {
            return Err(ResourceError::InvalidDescriptor(
                "buffer size must be greater than zero".to_string(),
            ));
        }
        if self.kind == BufferKind::Staging && self.usage.intersects(BufferUsage::DEVICE_READ) {
            return Err(ResourceError::InvalidDescriptor(
                "staging buffers cannot be bound for device reads".to_string(),
            ));
        }
        if self.kind == BufferKind::DeviceOnly && self.usage.contains(BufferUsage::MAP_WRITE) {
            return Err(ResourceError::InvalidDescriptor(
                "device-only buffers cannot be written by the host".to_string(),
            ));
        }
        Ok(())
    }
}

/// An opaque handle to a data buffer.
///
/// This ID is returned by [`GraphicsDevice::create_buffer`](crate::renderer::GraphicsDevice::create_buffer)
/// and is used to reference the buffer in all subsequent operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BufferId(pub usize);

/// Read-only facts about a live buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferInfo {
    /// The buffer's handle.
    pub id: BufferId,
    /// The memory class.
    pub kind: BufferKind,
    /// The resolved usage set.
    pub usage: BufferUsage,
    /// Size in bytes.
    pub size: u64,
}

impl BufferInfo {
    /// Checks that `offset..offset + size` lies inside the buffer.
    pub fn contains_range(&self, offset: u64, size: u64) -> bool {
        offset
            .checked_add(size)
            .is_some_and(|end| end <= self.size)
    }
}
