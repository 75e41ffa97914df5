use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use super::{Job, PoolError, WorkerPool, panic_message};

#[derive(Default)]
struct State {
    queue: VecDeque<Job>,
    in_flight: usize,
    shutdown: bool,
}

impl State {
    fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.in_flight == 0
    }
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    /// Signalled when a job is queued or the pool shuts down.
    work_available: Condvar,
    /// Signalled when the queue drains and no job is running.
    idle: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A fixed number of worker threads over one FIFO queue.
///
/// Dropping the pool waits for every queued job to finish, then joins the
/// workers. Must not be shut down or dropped from inside one of its jobs.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Hardware concurrency plus one.
    pub fn default_threads() -> usize {
        thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
            + 1
    }

    /// Starts `threads` workers (at least one).
    pub fn new(threads: usize) -> Result<Self, PoolError> {
        let threads = threads.max(1);
        let mut pool = Self {
            shared: Arc::new(Shared::default()),
            workers: Vec::with_capacity(threads),
        };
        for i in 0..threads {
            let shared = Arc::clone(&pool.shared);
            let worker = thread::Builder::new()
                .name(format!("commentary-worker-{i}"))
                .spawn(move || worker_loop(&shared))
                .map_err(PoolError::Spawn)?;
            pool.workers.push(worker);
        }
        log::debug!("started worker pool with {threads} threads");
        Ok(pool)
    }

    pub fn with_default_threads() -> Result<Self, PoolError> {
        Self::new(Self::default_threads())
    }

    /// Waits until the queue drains and no job is running, then stops
    /// accepting work. Idempotent.
    pub fn shutdown(&self) {
        let mut state = self.shared.lock();
        while !state.is_idle() {
            state = self
                .shared
                .idle
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if !state.shutdown {
            state.shutdown = true;
            log::debug!("worker pool shut down");
        }
        drop(state);
        self.shared.work_available.notify_all();
    }
}

impl WorkerPool for ThreadPool {
    fn execute(&self, job: Job) -> Result<(), PoolError> {
        let mut state = self.shared.lock();
        if state.shutdown {
            return Err(PoolError::ShutDown);
        }
        state.queue.push_back(job);
        drop(state);
        self.shared.work_available.notify_one();
        Ok(())
    }

    fn threads(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::error!("worker thread terminated abnormally");
            }
        }
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let job = {
            let mut state = shared.lock();
            loop {
                if let Some(job) = state.queue.pop_front() {
                    state.in_flight += 1;
                    break job;
                }
                if state.shutdown {
                    return;
                }
                state = shared
                    .work_available
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
            log::error!("job panicked: {}", panic_message(payload.as_ref()));
        }

        let mut state = shared.lock();
        state.in_flight -= 1;
        if state.is_idle() {
            shared.idle.notify_all();
        }
    }
}
