use crate::metrics::BatchMetrics;
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Replacement counts per variable, in the order each variable was first replaced.
pub type ReplacementCounts = IndexMap<String, usize>;

/// Errors that fail the processing of a single file.
///
/// These never escape the per-file boundary: the engines turn them into
/// [`OperationOutcome::Failed`] so sibling files keep going.
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("Environment variable {name} is not set (line {line}, column {column})")]
    VariableNotSet {
        name: String,
        line: usize,
        column: usize,
    },

    #[error("Environment variable {name} is missing in allow-list (line {line}, column {column})")]
    VariableNotAllowed {
        name: String,
        line: usize,
        column: usize,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render value of {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Task failed: {0}")]
    TaskFailed(String),
}

impl OperationError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// One changed reference, recorded only when verbose reporting is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementRecord {
    pub line: usize,
    pub column: usize,
    pub old: String,
    pub new: String,
}

/// Result of processing one file with either engine.
#[derive(Debug)]
pub enum OperationOutcome {
    /// Path does not resolve to a regular file
    Skipped,
    /// No reference produced a text change
    Untouched,
    /// File restored from its backup and the backup removed
    RolledBack,
    /// Rollback requested but there is no backup
    NoBackup,
    Replaced {
        counts: ReplacementCounts,
        total: usize,
        /// Empty unless the run is verbose
        changes: Vec<ReplacementRecord>,
    },
    Failed {
        error: OperationError,
    },
}

impl OperationOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Short lowercase label used in progress lines and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Untouched => "untouched",
            Self::RolledBack => "rolled back",
            Self::NoBackup => "no backup",
            Self::Replaced { .. } => "replaced",
            Self::Failed { .. } => "failed",
        }
    }

    /// Get a summary string of what happened to the file
    pub fn summary(&self) -> String {
        match self {
            Self::Skipped => "not a regular file".to_string(),
            Self::Untouched => "no replacements".to_string(),
            Self::RolledBack => "restored from backup".to_string(),
            Self::NoBackup => "no backup found".to_string(),
            Self::Replaced { counts, total, .. } => {
                let parts: Vec<String> = counts
                    .iter()
                    .map(|(name, count)| format!("{}x{}", name, count))
                    .collect();
                format!("{} replacements ({})", total, parts.join(", "))
            }
            Self::Failed { error } => error.to_string(),
        }
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.summary())
    }
}

/// A failed file in a batch, keyed by its position in the input list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub index: usize,
    pub path: Utf8PathBuf,
    pub message: String,
}

/// Aggregated result of one batch run.
///
/// `outcomes[i]` always belongs to the i-th input path, regardless of the
/// order in which the files finished.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<OperationOutcome>,
    pub failures: Vec<BatchFailure>,
    /// Counters for this batch only
    pub metrics: Arc<BatchMetrics>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Number of files that were rewritten (and therefore carry a backup).
    pub fn replaced_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, OperationOutcome::Replaced { .. }))
            .count()
    }

    pub fn rolled_back_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, OperationOutcome::RolledBack))
            .count()
    }

    /// Total number of references replaced across the batch.
    pub fn total_replacements(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                OperationOutcome::Replaced { total, .. } => *total,
                _ => 0,
            })
            .sum()
    }
}
