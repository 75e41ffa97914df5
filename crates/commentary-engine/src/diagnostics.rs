//! Error and warning sink shared by every stage.
//!
//! One instance is created per run and handed (usually as `Arc<Diagnostics>`)
//! to the parse driver and to the transformation passes. Counters are atomic,
//! so worker tasks may report concurrently.

use std::fmt::Display;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: AtomicUsize,
    warnings: AtomicUsize,
    warnings_as_errors: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink where every warning counts (and logs) as an error.
    pub fn with_warnings_as_errors(warnings_as_errors: bool) -> Self {
        Self {
            warnings_as_errors,
            ..Self::default()
        }
    }

    pub fn error(&self, message: impl Display) {
        log::error!("{message}");
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn warning(&self, message: impl Display) {
        if self.warnings_as_errors {
            self.error(message);
        } else {
            log::warn!("{message}");
            self.warnings.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }

    /// True once any error has been recorded; the run as a whole failed.
    pub fn has_failed(&self) -> bool {
        self.error_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn counts_errors_and_warnings_separately() {
        let diag = Diagnostics::new();
        diag.warning("unresolved link");
        diag.error("duplicate binding");
        diag.error("duplicate binding");
        assert_eq!(diag.warning_count(), 1);
        assert_eq!(diag.error_count(), 2);
        assert!(diag.has_failed());
    }

    #[test]
    fn warnings_escalate_when_requested() {
        let diag = Diagnostics::with_warnings_as_errors(true);
        diag.warning("unresolved link");
        assert_eq!(diag.warning_count(), 0);
        assert_eq!(diag.error_count(), 1);
    }

    #[test]
    fn fresh_sink_has_not_failed() {
        let diag = Diagnostics::new();
        diag.warning("only a warning");
        assert!(!diag.has_failed());
    }

    #[test]
    fn concurrent_reports_are_all_counted() {
        let diag = Arc::new(Diagnostics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let diag = Arc::clone(&diag);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        diag.error("boom");
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(diag.error_count(), 800);
    }
}
