#![forbid(unsafe_code)]

//! Single-worker render executor.
//!
//! [`TaskRunner`] owns one named background thread and a channel of
//! [`RenderJob`]s. Jobs run strictly in submission order, one at a time;
//! each job's completion continuation fires exactly once on the worker.
//!
//! The runner is process-wide: the host creates it once and hands cloneable
//! [`RunnerHandle`]s to every panel. Shutdown drains jobs queued ahead of
//! the shutdown message and joins the worker; no job executes after the
//! join returns, and submitting through a surviving handle afterwards
//! reports [`SubmitError::RunnerDisposed`].

use std::fmt;
use std::io;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::job::RenderJob;

enum WorkerMsg {
    Job(RenderJob),
    Shutdown,
}

/// Error returned when a job is submitted after the runner was disposed.
///
/// This is a programming-contract violation: a panel must not out-schedule
/// the runner it was constructed with. Callers assert in debug builds and
/// drop the job silently in release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    RunnerDisposed,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunnerDisposed => write!(f, "render job submitted after runner disposal"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Owner of the background render worker.
pub struct TaskRunner {
    sender: mpsc::Sender<WorkerMsg>,
    handle: Option<JoinHandle<()>>,
}

/// Cloneable submission handle for panels.
#[derive(Clone)]
pub struct RunnerHandle {
    sender: mpsc::Sender<WorkerMsg>,
}

impl TaskRunner {
    /// Spawn the worker thread.
    pub fn start() -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<WorkerMsg>();

        let handle = thread::Builder::new()
            .name("minimap-render".into())
            .spawn(move || worker_loop(rx))?;

        Ok(Self {
            sender: tx,
            handle: Some(handle),
        })
    }

    /// A submission handle to inject into a panel.
    pub fn handle(&self) -> RunnerHandle {
        RunnerHandle {
            sender: self.sender.clone(),
        }
    }

    /// Drain already-queued jobs, stop the worker, and join it.
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        let _ = self.sender.send(WorkerMsg::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TaskRunner {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

impl RunnerHandle {
    /// Enqueue a job without blocking.
    ///
    /// # Errors
    ///
    /// [`SubmitError::RunnerDisposed`] if the worker has been shut down.
    pub fn submit(&self, job: RenderJob) -> Result<(), SubmitError> {
        self.sender
            .send(WorkerMsg::Job(job))
            .map_err(|_| SubmitError::RunnerDisposed)
    }
}

fn worker_loop(rx: mpsc::Receiver<WorkerMsg>) {
    while let Ok(msg) = rx.recv() {
        match msg {
            WorkerMsg::Job(job) => {
                debug!(seq = job.seq(), "running render job");
                job.run();
            }
            WorkerMsg::Shutdown => return,
        }
    }
}
