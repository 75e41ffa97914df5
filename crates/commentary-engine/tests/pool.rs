use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use commentary_engine::pool::{PoolError, TaskError, enqueue, map_each};
use commentary_engine::{Diagnostics, SyncPool, ThreadPool, WorkerPool};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn dropping_the_pool_runs_every_queued_task(
    #[values(0, 1, 17, 256)] tasks: usize,
    #[values(1, 2, 4, 9)] threads: usize,
) {
    let done = Arc::new(AtomicUsize::new(0));
    {
        let pool = ThreadPool::new(threads).unwrap();
        for _ in 0..tasks {
            let done = Arc::clone(&done);
            pool.execute(Box::new(move || {
                done.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        }
    }
    assert_eq!(done.load(Ordering::SeqCst), tasks);
}

#[rstest]
fn handles_return_every_result(#[values(1, 3, 8)] threads: usize) {
    let pool = ThreadPool::new(threads).unwrap();
    let handles: Vec<_> = (0..64)
        .map(|i| enqueue(&pool, move || Ok(i * 2)).unwrap())
        .collect();
    let results: Vec<usize> = handles.into_iter().map(|h| h.wait().unwrap()).collect();
    assert_eq!(results, (0..64).map(|i| i * 2).collect::<Vec<_>>());
}

#[test]
fn shut_down_pool_rejects_work() {
    let pool = ThreadPool::new(2).unwrap();
    pool.shutdown();
    assert!(matches!(
        enqueue(&pool, || Ok(())),
        Err(PoolError::ShutDown)
    ));
}

fn boom() -> anyhow::Result<usize> {
    panic!("boom")
}

#[test]
fn synchronous_pool_captures_panics() {
    let handle = enqueue(&SyncPool, boom).unwrap();
    assert!(matches!(handle.wait(), Err(TaskError::Panicked(msg)) if msg == "boom"));
}

#[rstest]
#[case::inline(Box::new(SyncPool))]
#[case::threaded(Box::new(ThreadPool::new(4).unwrap()))]
fn batch_failures_are_logged_not_raised(#[case] pool: Box<dyn WorkerPool>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let diagnostics = Diagnostics::new();
    let items = (0..10).map(|i| (format!("unit {i}"), i)).collect();

    let results = map_each(pool.as_ref(), items, &diagnostics, |i: usize| {
        if i % 3 == 0 {
            anyhow::bail!("unit {i} is unlucky");
        }
        Ok(i)
    });

    assert_eq!(
        results,
        vec![None, Some(1), Some(2), None, Some(4), Some(5), None, Some(7), Some(8), None]
    );
    assert_eq!(diagnostics.error_count(), 4);
}
