use crate::metrics::BatchMetrics;
use crate::models::{BatchFailure, BatchReport, OperationError, OperationOutcome};
use crate::services::env::EnvLookup;
use crate::services::rollback::rollback;
use crate::services::substitution::SubstitutionService;
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;

/// Which engine a batch applies to every file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Substitute,
    Rollback,
}

/// Side channel notified as each file settles, in completion order.
#[cfg_attr(test, mockall::automock)]
pub trait ProgressReporter: Send + Sync {
    fn report(&self, index: usize, path: &Utf8Path, outcome: &OperationOutcome);
}

/// Reporter used when progress output is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _index: usize, _path: &Utf8Path, _outcome: &OperationOutcome) {}
}

/// Runs one engine over many files concurrently.
///
/// Every file gets its own task; a failure in one never cancels the others,
/// and the report is always ordered like the input.
pub struct BatchRunner {
    service: Arc<SubstitutionService>,
    env: Arc<dyn EnvLookup>,
    progress: Arc<dyn ProgressReporter>,
}

impl BatchRunner {
    pub fn new(service: SubstitutionService, env: Arc<dyn EnvLookup>) -> Self {
        Self {
            service: Arc::new(service),
            env,
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Launch `operation` for every path at once and wait for all of them.
    pub async fn run_all(&self, paths: &[Utf8PathBuf], operation: Operation) -> BatchReport {
        tracing::info!("Starting {:?} of {} files", operation, paths.len());

        // Counters cover this batch only
        let metrics = Arc::new(BatchMetrics::new());
        let mut tasks = Vec::with_capacity(paths.len());

        for (index, path) in paths.iter().enumerate() {
            let path = path.clone();
            let service = self.service.clone();
            let env = self.env.clone();
            let progress = self.progress.clone();
            let metrics = metrics.clone();

            tasks.push(tokio::spawn(async move {
                let outcome = match operation {
                    Operation::Substitute => service.substitute(&path, env.as_ref()).await,
                    Operation::Rollback => rollback(&path).await,
                };
                metrics.record(&outcome);
                progress.report(index, &path, &outcome);
                outcome
            }));
        }

        // Awaiting in spawn order restores input order regardless of completion order
        let mut report = BatchReport::default();
        for (index, task) in tasks.into_iter().enumerate() {
            let outcome = task.await.unwrap_or_else(|e| {
                tracing::error!("Task for {} did not complete: {}", paths[index], e);
                let outcome = OperationOutcome::Failed {
                    error: OperationError::TaskFailed(e.to_string()),
                };
                metrics.record(&outcome);
                outcome
            });

            if let OperationOutcome::Failed { error } = &outcome {
                report.failures.push(BatchFailure {
                    index,
                    path: paths[index].clone(),
                    message: error.to_string(),
                });
            }
            report.outcomes.push(outcome);
        }

        metrics.log_summary();
        report.metrics = metrics;
        report
    }
}
