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

//! Recording-time argument types and submission fences.

use crate::renderer::api::buffer::BufferId;
use crate::renderer::error::RenderError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// A buffer and byte offset bound to one vertex binding slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexBufferBinding {
    /// The vertex buffer.
    pub buffer: BufferId,
    /// Byte offset of the first vertex.
    pub offset: u64,
}

impl VertexBufferBinding {
    /// Binds `buffer` from its first byte.
    pub const fn new(buffer: BufferId) -> Self {
        Self { buffer, offset: 0 }
    }

    /// Binds `buffer` starting at `offset`.
    pub const fn with_offset(buffer: BufferId, offset: u64) -> Self {
        Self { buffer, offset }
    }
}

/// The completion signal of one submitted command list.
///
/// Returned by [`CommandBuffer::submit`](crate::renderer::CommandBuffer::submit).
/// The executing side holds the matching [`FenceSignal`].
#[derive(Debug)]
pub struct SubmissionFence {
    receiver: flume::Receiver<()>,
    completed: AtomicBool,
}

/// The executing side of a [`SubmissionFence`].
#[derive(Debug)]
pub struct FenceSignal {
    sender: flume::Sender<()>,
}

impl SubmissionFence {
    /// Creates a connected signal/fence pair.
    pub fn pair() -> (FenceSignal, SubmissionFence) {
        let (sender, receiver) = flume::bounded(1);
        (
            FenceSignal { sender },
            SubmissionFence {
                receiver,
                completed: AtomicBool::new(false),
            },
        )
    }

    /// Creates a fence that is already complete.
    pub fn signaled() -> Self {
        let (signal, fence) = Self::pair();
        signal.signal();
        fence
    }

    /// Returns `true` once the submission is no longer pending, either because it
    /// executed or because the context executing it was lost.
    pub fn is_complete(&self) -> bool {
        self.completed.load(Ordering::Acquire)
            || !self.receiver.is_empty()
            || self.receiver.is_disconnected()
    }

    /// Blocks the calling thread until the submission has executed.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ContextLost`] if the executing context went away
    /// before the work completed.
    pub fn wait(&self) -> Result<(), RenderError> {
        if self.completed.load(Ordering::Acquire) {
            return Ok(());
        }
        self.receiver.recv().map_err(|_| RenderError::ContextLost)?;
        self.completed.store(true, Ordering::Release);
        Ok(())
    }
}

impl FenceSignal {
    /// Marks the submission as complete.
    pub fn signal(self) {
        // The fence may already be dropped; nobody is waiting then.
        let _ = self.sender.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fence_signaled_across_threads() {
        let (signal, fence) = SubmissionFence::pair();
        assert!(!fence.is_complete());
        let handle = std::thread::spawn(move || signal.signal());
        assert_eq!(fence.wait(), Ok(()));
        handle.join().unwrap();
        assert!(fence.is_complete());
    }

    #[test]
    fn test_pre_signaled_fence() {
        let fence = SubmissionFence::signaled();
        assert!(fence.is_complete());
        assert_eq!(fence.wait(), Ok(()));
    }

    #[test]
    fn test_dropped_signal_reports_context_lost() {
        let (signal, fence) = SubmissionFence::pair();
        drop(signal);
        assert!(fence.is_complete());
        assert_eq!(fence.wait(), Err(RenderError::ContextLost));
    }
}
