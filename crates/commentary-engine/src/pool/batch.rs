//! One task per element, results in submission order.
//!
//! Failures are recorded in the diagnostics sink against the element's
//! label and never propagate to the caller or to sibling elements.

use std::sync::Arc;

use crate::diagnostics::Diagnostics;

use super::{WorkerPool, enqueue};

/// Runs `f` on every element and returns the results in input order;
/// `None` marks an element that failed.
pub fn map_each<T, R, F>(
    pool: &dyn WorkerPool,
    items: Vec<(String, T)>,
    diagnostics: &Diagnostics,
    f: F,
) -> Vec<Option<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> anyhow::Result<R> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let pending: Vec<_> = items
        .into_iter()
        .map(|(label, item)| {
            let f = Arc::clone(&f);
            (label, enqueue(pool, move || (*f)(item)))
        })
        .collect();

    pending
        .into_iter()
        .map(|(label, handle)| {
            let outcome = handle
                .map_err(anyhow::Error::from)
                .and_then(|h| h.wait().map_err(anyhow::Error::from));
            match outcome {
                Ok(value) => Some(value),
                Err(e) => {
                    diagnostics.error(format!("{label}: {e:#}"));
                    None
                }
            }
        })
        .collect()
}

/// Like [`map_each`] for side effects; returns the number of failures.
pub fn for_each<T, F>(
    pool: &dyn WorkerPool,
    items: Vec<(String, T)>,
    diagnostics: &Diagnostics,
    f: F,
) -> usize
where
    T: Send + 'static,
    F: Fn(T) -> anyhow::Result<()> + Send + Sync + 'static,
{
    map_each(pool, items, diagnostics, f)
        .iter()
        .filter(|r| r.is_none())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{SyncPool, ThreadPool};
    use pretty_assertions::assert_eq;

    fn labeled(n: usize) -> Vec<(String, usize)> {
        (0..n).map(|i| (format!("item {i}"), i)).collect()
    }

    #[test]
    fn results_keep_submission_order() {
        let pool = ThreadPool::new(4).unwrap();
        let diag = Diagnostics::new();
        let out = map_each(&pool, labeled(20), &diag, |i| Ok(i * 10));
        assert_eq!(out, (0..20).map(|i| Some(i * 10)).collect::<Vec<_>>());
        assert_eq!(diag.error_count(), 0);
    }

    #[test]
    fn failures_are_counted_not_rethrown() {
        let diag = Diagnostics::new();
        let failures = for_each(&SyncPool, labeled(5), &diag, |i| {
            if i % 2 == 0 {
                anyhow::bail!("even item");
            }
            if i == 3 {
                panic!("item three");
            }
            Ok(())
        });
        assert_eq!(failures, 4);
        assert_eq!(diag.error_count(), 4);
    }
}
