//! Data models for envstamp.
//!
//! - [`SubstitutionConfig`]: the resolved, immutable configuration passed into every engine call
//! - [`RunOptions`]: batch-level switches (rollback mode, progress)
//! - [`Settings`]: the optional `envstamp.yaml` file schema
//! - [`OperationOutcome`]: the per-file result produced by both engines
//! - [`BatchReport`]: the aggregated, input-ordered result of a batch

pub mod config;
pub mod outcome;

pub use config::{
    BACKUP_SUFFIX, DEFAULT_PREFIX, MISSING_VALUE_LITERAL, RunOptions, Settings, SubstitutionConfig,
};
pub use outcome::{
    BatchFailure, BatchReport, OperationError, OperationOutcome, ReplacementCounts,
    ReplacementRecord,
};
