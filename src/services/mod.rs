//! Services module - the substitution and rollback engine.
//!
//! The services have no dependency on the CLI layer; every call takes its
//! configuration explicitly.
//!
//! # Components
//!
//! - [`ReferenceMatcher`]: finds `<prefix>.<IDENTIFIER>` references and their byte offsets
//! - [`resolve_position`]: turns an offset into a 1-based line/column for reporting
//! - [`AllowList`]: wildcard allow-list deciding which variables may be substituted
//! - [`SubstitutionService`]: rewrites one file, writing its `.envs` backup first
//! - [`rollback`]: restores one file from its backup and deletes the backup
//! - [`BatchRunner`]: runs either engine over many files concurrently and
//!   returns an input-ordered [`BatchReport`](crate::models::BatchReport)
//! - [`EnvLookup`]: read-only value source shared by all file tasks
//!
//! # Usage Example
//!
//! ```ignore
//! use envstamp::services::{BatchRunner, EnvSnapshot, Operation, SubstitutionService};
//!
//! let service = SubstitutionService::new(config)?;
//! let runner = BatchRunner::new(service, Arc::new(EnvSnapshot::capture()));
//! let report = runner.run_all(&paths, Operation::Substitute).await;
//! ```
//!
//! # Persistence
//!
//! The only on-disk state is the sibling `<file>.envs` backup. It is written
//! before the target file is overwritten, so every modified file can always
//! be restored with a rollback run.

pub mod batch;
pub mod env;
pub mod filter;
pub mod matcher;
pub mod rollback;
pub mod substitution;

pub use batch::{BatchRunner, NoProgress, Operation, ProgressReporter};
pub use env::{EnvLookup, EnvSnapshot};
pub use filter::{AllowList, AllowListError};
pub use matcher::{Occurrence, ReferenceMatcher, resolve_position};
pub use rollback::{backup_path, rollback};
pub use substitution::{Rewrite, SubstitutionService};
