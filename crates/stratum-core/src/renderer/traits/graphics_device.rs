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

use crate::renderer::api::*;
use crate::renderer::error::{RenderError, ResourceError};
use crate::renderer::traits::CommandProcessor;
use std::fmt::Debug;
use std::sync::Arc;

/// The main interface for creating and managing resources on one backend.
///
/// A device owns every buffer, pipeline, render pass, and frame buffer it
/// creates. Those resources may be referenced by many command buffers at once;
/// only the application may destroy them, and it must first make sure (for
/// instance with [`wait_idle`](GraphicsDevice::wait_idle)) that no submitted
/// command list still references them.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Returns what this device can do.
    fn capabilities(&self) -> DeviceCapabilities;

    /// Creates a new data buffer.
    /// ## Arguments
    /// * `descriptor` - The buffer's kind, size, and usages.
    /// ## Errors
    /// * `ResourceError` - If the descriptor is invalid or the backend fails.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError>;

    /// Creates a host-writable buffer and fills it with `data`.
    /// ## Errors
    /// * `ResourceError::InvalidDescriptor` - If the buffer kind is not host-writable.
    /// * `ResourceError::OutOfBounds` - If `data` is larger than the buffer.
    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError>;

    /// Writes host data into a mappable or staging buffer immediately.
    ///
    /// The write is ordered after every command list submitted before it.
    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError>;

    /// Returns the facts about a live buffer.
    fn buffer_info(&self, id: BufferId) -> Option<BufferInfo>;

    /// Destroys a buffer.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Creates a resource layout.
    fn create_resource_layout(
        &self,
        descriptor: &ResourceLayoutDescriptor,
    ) -> Result<ResourceLayoutId, ResourceError>;

    /// Creates a pipeline. The descriptor is validated and compiled once.
    fn create_pipeline(&self, descriptor: &PipelineDescriptor) -> Result<PipelineId, ResourceError>;

    /// Destroys a pipeline.
    fn destroy_pipeline(&self, id: PipelineId) -> Result<(), ResourceError>;

    /// Creates a render pass.
    fn create_render_pass(
        &self,
        descriptor: &RenderPassDescriptor,
    ) -> Result<RenderPassId, ResourceError>;

    /// Destroys a render pass.
    fn destroy_render_pass(&self, id: RenderPassId) -> Result<(), ResourceError>;

    /// Creates a frame buffer compatible with a render pass.
    fn create_frame_buffer(
        &self,
        descriptor: &FrameBufferDescriptor,
    ) -> Result<FrameBufferId, ResourceError>;

    /// Destroys a frame buffer.
    fn destroy_frame_buffer(&self, id: FrameBufferId) -> Result<(), ResourceError>;

    /// The number of command processors this device exposes.
    fn command_processor_count(&self) -> usize;

    /// Returns one of the device's command processors.
    fn command_processor(&self, index: usize) -> Option<Arc<dyn CommandProcessor>>;

    /// Blocks the calling thread until all submitted work has completed.
    fn wait_idle(&self) -> Result<(), RenderError>;
}
