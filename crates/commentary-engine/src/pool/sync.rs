use super::{Job, PoolError, WorkerPool};

/// Runs every job inline, on the thread that submits it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncPool;

impl WorkerPool for SyncPool {
    fn execute(&self, job: Job) -> Result<(), PoolError> {
        job();
        Ok(())
    }

    fn threads(&self) -> usize {
        1
    }
}
