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

//! The thread that owns the native context.
//!
//! Native contexts are bound to the thread that made them current, so every
//! native call the device makes goes through one dedicated thread fed by a FIFO
//! channel. Submissions and resource jobs share that channel, which is what
//! orders them.

use super::command_list::CommandList;
use super::native::{GlCall, GlContext};
use std::thread::JoinHandle;
use stratum_core::renderer::api::command::FenceSignal;
use stratum_core::renderer::RenderError;

/// Creates the native context. Runs on the context thread.
pub type ContextFactory = Box<dyn FnOnce() -> Result<Box<dyn GlContext>, String> + Send>;

type ContextJob = Box<dyn FnOnce(&mut dyn GlContext) + Send>;

enum Job {
    Execute {
        list: CommandList,
        signal: FenceSignal,
    },
    Run(ContextJob),
    Shutdown,
}

#[derive(Debug)]
pub(crate) struct ContextThread {
    sender: flume::Sender<Job>,
    handle: Option<JoinHandle<()>>,
}

impl ContextThread {
    /// Spawns the thread and waits until the context has been created on it.
    pub fn spawn(name: &str, factory: ContextFactory) -> Result<Self, RenderError> {
        let (sender, receiver) = flume::unbounded::<Job>();
        let (ready_tx, ready_rx) = flume::bounded::<Result<(), String>>(1);

        let handle = std::thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                let mut context = match factory() {
                    Ok(context) => {
                        let _ = ready_tx.send(Ok(()));
                        context
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                run_jobs(&mut *context, &receiver);
            })
            .map_err(|e| RenderError::InitializationFailed(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                log::debug!("Context thread '{}' is running.", name);
                Ok(Self {
                    sender,
                    handle: Some(handle),
                })
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(RenderError::InitializationFailed(e))
            }
            Err(_) => {
                let _ = handle.join();
                Err(RenderError::InitializationFailed(
                    "the context thread exited during initialization".to_owned(),
                ))
            }
        }
    }

    /// Queues a command list. `signal` fires once every command has been issued.
    pub fn execute(&self, list: CommandList, signal: FenceSignal) -> Result<(), RenderError> {
        self.sender
            .send(Job::Execute { list, signal })
            .map_err(|_| RenderError::ContextLost)
    }

    /// Queues a job without waiting for it.
    pub fn post<F>(&self, job: F) -> Result<(), RenderError>
    where
        F: FnOnce(&mut dyn GlContext) + Send + 'static,
    {
        self.sender
            .send(Job::Run(Box::new(job)))
            .map_err(|_| RenderError::ContextLost)
    }

    /// Queues a job and blocks until it has run, returning its result.
    pub fn run<R, F>(&self, job: F) -> Result<R, RenderError>
    where
        R: Send + 'static,
        F: FnOnce(&mut dyn GlContext) -> R + Send + 'static,
    {
        let (reply_tx, reply_rx) = flume::bounded(1);
        self.post(move |gl| {
            let _ = reply_tx.send(job(gl));
        })?;
        reply_rx.recv().map_err(|_| RenderError::ContextLost)
    }

    /// Blocks until everything queued so far has been issued and finished.
    pub fn wait_idle(&self) -> Result<(), RenderError> {
        self.run(|gl| gl.issue(GlCall::Finish))
    }
}

fn run_jobs(gl: &mut dyn GlContext, receiver: &flume::Receiver<Job>) {
    while let Ok(job) = receiver.recv() {
        match job {
            Job::Execute { list, signal } => {
                log::trace!("Executing a command list of {} commands.", list.len());
                list.execute(gl);
                signal.signal();
            }
            Job::Run(job) => job(gl),
            Job::Shutdown => break,
        }
    }
    log::debug!("Context thread is shutting down.");
}

impl Drop for ContextThread {
    fn drop(&mut self) {
        let _ = self.sender.send(Job::Shutdown);
        if let Some(handle) = self.handle.take() {
            // Never join from the context thread itself.
            if handle.thread().id() == std::thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                log::error!("The context thread panicked.");
            }
        }
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Job::Execute { list, .. } => write!(f, "Execute({} commands)", list.len()),
            Job::Run(_) => write!(f, "Run"),
            Job::Shutdown => write!(f, "Shutdown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gl::native::{GlBuffer, GlVertexArray};
    use std::sync::{Arc, Mutex};
    use stratum_core::renderer::api::command::SubmissionFence;

    struct CountingContext(Arc<Mutex<Vec<String>>>);

    impl GlContext for CountingContext {
        fn issue(&mut self, call: GlCall<'_>) {
            self.0.lock().unwrap().push(format!("{call:?}"));
        }

        fn create_buffer(&mut self) -> Result<GlBuffer, String> {
            Err("unsupported".to_owned())
        }

        fn create_vertex_array(&mut self) -> Result<GlVertexArray, String> {
            Err("unsupported".to_owned())
        }

        fn swap_buffers(&mut self) -> Result<(), String> {
            Ok(())
        }
    }

    fn spawn(log: Arc<Mutex<Vec<String>>>) -> ContextThread {
        ContextThread::spawn(
            "test-context",
            Box::new(move || Ok(Box::new(CountingContext(log)) as Box<dyn GlContext>)),
        )
        .unwrap()
    }

    #[test]
    fn test_failed_factory_is_reported() {
        let result = ContextThread::spawn("failing", Box::new(|| Err("no display".to_owned())));
        assert_eq!(
            result.unwrap_err(),
            RenderError::InitializationFailed("no display".to_owned())
        );
    }

    #[test]
    fn test_jobs_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let thread = spawn(log.clone());

        let (signal, fence) = SubmissionFence::pair();
        thread.execute(CommandList::new(), signal).unwrap();
        thread.post(|gl| gl.issue(GlCall::Enable(1))).unwrap();
        let answer = thread.run(|_| 42).unwrap();

        assert_eq!(answer, 42);
        fence.wait().unwrap();
        thread.wait_idle().unwrap();
        let calls = log.lock().unwrap().clone();
        assert_eq!(calls, vec!["Enable(1)".to_owned(), "Finish".to_owned()]);
    }
}
