// Batch metrics
//
// Lightweight counters for one batch run, logged when the batch settles

use crate::models::OperationOutcome;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Per-batch outcome counters.
///
/// Uses atomic operations so every file task can record its outcome
/// without locks.
#[derive(Debug)]
pub struct BatchMetrics {
    pub files_replaced: AtomicUsize,
    pub files_untouched: AtomicUsize,
    pub files_skipped: AtomicUsize,
    pub files_failed: AtomicUsize,
    pub files_rolled_back: AtomicUsize,
    pub files_without_backup: AtomicUsize,

    /// Total references replaced across all files
    pub replacements: AtomicUsize,

    start_time: Instant,
}

impl BatchMetrics {
    pub fn new() -> Self {
        Self {
            files_replaced: AtomicUsize::new(0),
            files_untouched: AtomicUsize::new(0),
            files_skipped: AtomicUsize::new(0),
            files_failed: AtomicUsize::new(0),
            files_rolled_back: AtomicUsize::new(0),
            files_without_backup: AtomicUsize::new(0),
            replacements: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record the outcome of one file
    pub fn record(&self, outcome: &OperationOutcome) {
        let counter = match outcome {
            OperationOutcome::Skipped => &self.files_skipped,
            OperationOutcome::Untouched => &self.files_untouched,
            OperationOutcome::RolledBack => &self.files_rolled_back,
            OperationOutcome::NoBackup => &self.files_without_backup,
            OperationOutcome::Failed { .. } => &self.files_failed,
            OperationOutcome::Replaced { total, .. } => {
                self.replacements.fetch_add(*total, Ordering::Relaxed);
                &self.files_replaced
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of files recorded so far
    pub fn processed(&self) -> usize {
        [
            &self.files_replaced,
            &self.files_untouched,
            &self.files_skipped,
            &self.files_failed,
            &self.files_rolled_back,
            &self.files_without_backup,
        ]
        .iter()
        .map(|c| c.load(Ordering::Relaxed))
        .sum()
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!(
            "Batch finished in {:.2}s: {} files processed",
            self.elapsed().as_secs_f64(),
            self.processed()
        );
        tracing::info!(
            "Files: {} replaced ({} references), {} untouched, {} skipped, {} failed",
            self.files_replaced.load(Ordering::Relaxed),
            self.replacements.load(Ordering::Relaxed),
            self.files_untouched.load(Ordering::Relaxed),
            self.files_skipped.load(Ordering::Relaxed),
            self.files_failed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Rollback: {} restored, {} without backup",
            self.files_rolled_back.load(Ordering::Relaxed),
            self.files_without_backup.load(Ordering::Relaxed)
        );
    }
}

impl Default for BatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}
