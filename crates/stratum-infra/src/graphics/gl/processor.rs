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

use super::device::GlDevice;
use super::recorder::GlCommandBuffer;
use stratum_core::renderer::traits::{CommandBuffer, CommandProcessor};
use stratum_core::renderer::{GraphicsDevice, RenderError};

/// Hands out command buffers whose lists execute on the device's context thread.
///
/// Every processor of a device feeds the same FIFO, so submissions execute in
/// the order `submit` was called, across processors too.
#[derive(Debug, Clone)]
pub struct GlCommandProcessor {
    device: GlDevice,
    index: usize,
}

impl GlCommandProcessor {
    pub(crate) fn new(device: GlDevice, index: usize) -> Self {
        Self { device, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Allocates a concrete command buffer, for callers that want to inspect
    /// what it records.
    pub fn command_buffer(&self) -> GlCommandBuffer {
        GlCommandBuffer::new(self.device.clone(), self.index)
    }
}

impl CommandProcessor for GlCommandProcessor {
    fn allocate_command_buffer(&self) -> Box<dyn CommandBuffer> {
        Box::new(self.command_buffer())
    }

    fn wait_idle(&self) -> Result<(), RenderError> {
        self.device.wait_idle()
    }
}
