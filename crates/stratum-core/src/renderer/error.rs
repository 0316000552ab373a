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

//! Defines the hierarchy of error types for the rendering subsystem.
//!
//! Recording errors are split the same way callers have to reason about them:
//! a [`StateError`] means the call was issued at the wrong point of the
//! recording session, an [`ArgumentError`] means the call itself was malformed.
//! Neither is retried and neither leaves a command behind.

use crate::renderer::api::buffer::{BufferId, BufferUsage};
use crate::renderer::api::pass::{FrameBufferId, RenderPassId};
use crate::renderer::api::pipeline::{PipelineId, ResourceLayoutId};
use crate::renderer::api::settings::{BackendKind, TargetOs};
use crate::renderer::api::shader::ShaderProgramId;
use thiserror::Error;

/// A recording call was issued while the command buffer was in the wrong state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// A recording call was made before `begin` or after `end`.
    #[error("the command buffer is not recording")]
    NotRecording,
    /// `begin` was called on a command buffer that is already recording.
    #[error("the command buffer is already recording")]
    AlreadyRecording,
    /// `submit` was called on a command buffer that was never sealed with `end`.
    #[error("the command buffer has not been ended")]
    NotSealed,
    /// A pass-scoped call was made with no render pass active.
    #[error("no render pass is active")]
    NoRenderPass,
    /// A call that must happen outside a render pass was made inside one,
    /// or a render pass was begun while another is active.
    #[error("a render pass is already active")]
    RenderPassActive,
    /// A pipeline-scoped call was made with no pipeline bound.
    #[error("no pipeline is bound")]
    NoPipeline,
    /// A draw was recorded while a vertex binding the pipeline reads has no buffer.
    #[error("vertex binding {binding} is read by the pipeline but has no buffer bound")]
    MissingVertexBinding {
        /// The unbound slot.
        binding: u32,
    },
    /// An indexed draw was recorded with no index buffer bound.
    #[error("no index buffer is bound")]
    NoIndexBuffer,
}

/// A recording call received an argument it cannot accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// The buffer lacks a usage flag required by the call.
    #[error("buffer {buffer:?} lacks the required usage {required:?}")]
    BufferUsage {
        /// The offending buffer.
        buffer: BufferId,
        /// The usage the call requires.
        required: BufferUsage,
    },
    /// A binding slot is not declared by the bound pipeline or exceeds the device limit.
    #[error("binding index {binding} is invalid (limit {limit})")]
    BindingIndex {
        /// The requested binding slot.
        binding: u32,
        /// The exclusive upper bound accepted for this call.
        limit: u32,
    },
    /// The buffer handle does not reference a live buffer.
    #[error("unknown buffer {0:?}")]
    UnknownBuffer(BufferId),
    /// The pipeline handle does not reference a live pipeline.
    #[error("unknown pipeline {0:?}")]
    UnknownPipeline(PipelineId),
    /// The render pass handle does not reference a live render pass.
    #[error("unknown render pass {0:?}")]
    UnknownRenderPass(RenderPassId),
    /// The frame buffer handle does not reference a live frame buffer.
    #[error("unknown frame buffer {0:?}")]
    UnknownFrameBuffer(FrameBufferId),
    /// A byte range does not fit inside the buffer.
    #[error("range {offset}+{size} is out of bounds for buffer {buffer:?} of {capacity} bytes")]
    OutOfBounds {
        /// The buffer being accessed.
        buffer: BufferId,
        /// Start of the accessed range.
        offset: u64,
        /// Length of the accessed range.
        size: u64,
        /// Total size of the buffer.
        capacity: u64,
    },
    /// The number of clear values does not match the render pass attachments.
    #[error("expected {expected} clear values, got {actual}")]
    ClearValueCount {
        /// Number of attachments in the render pass.
        expected: usize,
        /// Number of clear values supplied.
        actual: usize,
    },
    /// A clear value does not match the kind of the attachment it targets.
    #[error("clear value {index} does not match its attachment")]
    ClearValueKind {
        /// Position of the clear value.
        index: usize,
    },
    /// An index buffer offset is not a multiple of the index size.
    #[error("index buffer offset {offset} is not aligned to {alignment} bytes")]
    IndexOffsetAlignment {
        /// The requested byte offset.
        offset: u64,
        /// The size of one index.
        alignment: u64,
    },
    /// A base vertex moves a vertex binding before the start of its buffer and
    /// the backend cannot express it natively.
    #[error("base vertex {base_vertex} moves vertex binding {binding} before its buffer")]
    BaseVertexOutOfRange {
        /// The affected vertex binding.
        binding: u32,
        /// The requested base vertex.
        base_vertex: i32,
    },
    /// A device-only buffer was bound for reading before any upload into it was
    /// submitted or recorded earlier in the same command buffer.
    /// Only reported when validation is enabled.
    #[error("device-only buffer {0:?} is read before any staging upload into it")]
    UninitializedDeviceBuffer(BufferId),
}

/// An error reported synchronously by a [`CommandBuffer`](crate::renderer::CommandBuffer) call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The call was issued at the wrong point of the recording session.
    #[error("invalid recording state: {0}")]
    State(#[from] StateError),
    /// The call received an invalid argument.
    #[error("invalid argument: {0}")]
    Argument(#[from] ArgumentError),
}

impl RecordError {
    /// Returns `true` if this is a [`StateError`].
    pub fn is_state(&self) -> bool {
        matches!(self, RecordError::State(_))
    }

    /// Returns `true` if this is an [`ArgumentError`].
    pub fn is_argument(&self) -> bool {
        matches!(self, RecordError::Argument(_))
    }
}

/// An error related to the creation of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Two vertex attributes use the same shader location.
    #[error("shader location {location} is used by more than one vertex attribute")]
    DuplicateShaderLocation {
        /// The duplicated location.
        location: u32,
    },
    /// Two vertex buffer layouts use the same binding slot.
    #[error("vertex binding {binding} is declared more than once")]
    DuplicateVertexBinding {
        /// The duplicated binding slot.
        binding: u32,
    },
    /// An attribute does not fit inside its buffer stride.
    #[error("attribute at location {location} overflows the stride of binding {binding}")]
    AttributeOutsideStride {
        /// The vertex binding the attribute belongs to.
        binding: u32,
        /// The attribute's shader location.
        location: u32,
    },
    /// A vertex binding exceeds the device limit.
    #[error("vertex binding {binding} exceeds the device limit of {limit}")]
    VertexBindingLimit {
        /// The requested binding slot.
        binding: u32,
        /// The device limit.
        limit: u32,
    },
    /// The shader program handle is not valid.
    #[error("invalid shader program {0:?}")]
    InvalidShaderProgram(ShaderProgramId),
    /// The resource layout handle does not reference a live layout.
    #[error("unknown resource layout {0:?}")]
    UnknownResourceLayout(ResourceLayoutId),
}

/// An error related to the creation or use of a device resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// A pipeline-specific error occurred.
    #[error("pipeline resource error: {0}")]
    Pipeline(#[from] PipelineError),
    /// A resource could not be found.
    #[error("resource not found")]
    NotFound,
    /// The descriptor used to create a resource is invalid.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
    /// An attempt was made to access a resource out of its bounds.
    #[error("resource access out of bounds")]
    OutOfBounds,
    /// An error originating from the specific graphics backend implementation.
    #[error("backend-specific resource error: {0}")]
    BackendError(String),
}

/// A high-level error that can occur within the graphics device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The requested backend cannot run on the requested operating system.
    #[error("backend {backend:?} is not supported on {os:?}")]
    BackendUnsupported {
        /// The requested backend.
        backend: BackendKind,
        /// The operating system it was requested for.
        os: TargetOs,
    },
    /// A failure occurred during the initialization of the graphics backend.
    #[error("failed to initialize graphics backend: {0}")]
    InitializationFailed(String),
    /// The native context is gone (its thread exited or panicked).
    #[error("the native graphics context was lost")]
    ContextLost,
    /// The presentation surface cannot provide a frame right now.
    #[error("the presentation surface is not ready")]
    SurfaceNotReady,
    /// A recording error surfaced through a higher-level call.
    #[error("command recording failed: {0}")]
    Record(#[from] RecordError),
    /// An error occurred while managing a device resource.
    #[error("graphics resource operation failed: {0}")]
    Resource(#[from] ResourceError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_record_error_classification() {
        let state: RecordError = StateError::NoPipeline.into();
        assert!(state.is_state());
        assert!(!state.is_argument());

        let arg: RecordError = ArgumentError::UnknownBuffer(BufferId(3)).into();
        assert!(arg.is_argument());
    }

    #[test]
    fn test_record_error_display() {
        let err: RecordError = StateError::NoRenderPass.into();
        assert_eq!(format!("{err}"), "invalid recording state: no render pass is active");

        let err: RecordError = ArgumentError::BindingIndex {
            binding: 20,
            limit: 16,
        }
        .into();
        assert_eq!(
            format!("{err}"),
            "invalid argument: binding index 20 is invalid (limit 16)"
        );
    }

    #[test]
    fn test_render_error_wraps_resource_error() {
        let res_err: ResourceError = PipelineError::DuplicateShaderLocation { location: 1 }.into();
        let render_err: RenderError = res_err.clone().into();
        assert!(render_err.source().is_some());
        assert_eq!(
            format!("{render_err}"),
            "graphics resource operation failed: pipeline resource error: shader location 1 is used by more than one vertex attribute"
        );
    }

    #[test]
    fn test_backend_unsupported_display() {
        let err = RenderError::BackendUnsupported {
            backend: BackendKind::GlCore,
            os: TargetOs::Android,
        };
        assert_eq!(format!("{err}"), "backend GlCore is not supported on Android");
    }
}
