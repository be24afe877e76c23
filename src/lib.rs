// envstamp - Inject environment variables into built static files at start-up
//
// This is the library crate containing the substitution and rollback engine.
// The binary crate (main.rs) is a thin CLI shell around it.

pub mod cli;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{BatchReport, OperationError, OperationOutcome, RunOptions, SubstitutionConfig};
pub use services::{BatchRunner, Operation, SubstitutionService};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
