//! # Worker Pool
//!
//! Bounded-concurrency execution of independent units (one comment, one
//! file or one top-level entity per task).
//!
//! - **`sync`**: `SyncPool` runs every job inline on the caller's thread
//! - **`threaded`**: `ThreadPool`, a fixed set of OS threads over one queue
//! - **`batch`**: submit one task per element, await in submission order
//!
//! Only the orchestrating thread waits on a [`TaskHandle`]; tasks never wait
//! on each other.

pub mod batch;
pub mod sync;
pub mod threaded;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;

pub use batch::{for_each, map_each};
pub use sync::SyncPool;
pub use threaded::ThreadPool;

/// A unit of work as seen by a pool.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("worker pool has been shut down")]
    ShutDown,
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("{0:#}")]
    Failed(anyhow::Error),
    #[error("task panicked: {0}")]
    Panicked(String),
    #[error("task was dropped before it completed")]
    Lost,
}

pub trait WorkerPool: Send + Sync {
    /// Queues a job. Fails once the pool has been shut down.
    fn execute(&self, job: Job) -> Result<(), PoolError>;

    /// Number of jobs that may run at the same time.
    fn threads(&self) -> usize;
}

/// The pending result of an enqueued task.
#[derive(Debug)]
pub struct TaskHandle<T> {
    rx: mpsc::Receiver<Result<T, TaskError>>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the task has run.
    pub fn wait(self) -> Result<T, TaskError> {
        self.rx.recv().unwrap_or(Err(TaskError::Lost))
    }
}

/// Submits `f` to `pool`. Errors and panics of `f` are captured into the
/// returned handle.
pub fn enqueue<P, T, F>(pool: &P, f: F) -> Result<TaskHandle<T>, PoolError>
where
    P: WorkerPool + ?Sized,
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    pool.execute(Box::new(move || {
        let result = match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(TaskError::Failed(e)),
            Err(payload) => Err(TaskError::Panicked(panic_message(payload.as_ref()))),
        };
        // Nobody may be waiting for the result any more.
        let _ = tx.send(result);
    }))?;
    Ok(TaskHandle { rx })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
