use crate::services::AllowList;
use serde::{Deserialize, Serialize};

/// Reference prefix recognised by default (`process.env.NAME`).
pub const DEFAULT_PREFIX: &str = "process.env";

/// Literal written in place of an allowed but unset variable when
/// `allow_missing` is on. Copied verbatim into the processed files.
pub const MISSING_VALUE_LITERAL: &str = "undefined";

/// Suffix appended to a file name to form its backup path.
pub const BACKUP_SUFFIX: &str = ".envs";

/// Settings file schema (`envstamp.yaml`).
///
/// Every key is optional; missing keys fall back to the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Allow-list tokens; `*` matches any run of characters
    pub vars: Vec<String>,

    /// Leave references outside the allow-list untouched instead of failing
    #[serde(alias = "allow_unreplaced")]
    pub ignore_other: bool,

    /// Replace unset variables with the missing-value literal instead of failing
    pub allow_missing: bool,

    /// Print one status line per file as it completes
    pub progress: bool,

    pub prefix: String,

    pub missing_literal: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vars: Vec::new(),
            ignore_other: false,
            allow_missing: false,
            progress: true,
            prefix: DEFAULT_PREFIX.to_string(),
            missing_literal: MISSING_VALUE_LITERAL.to_string(),
        }
    }
}

/// Resolved configuration handed to every engine call.
#[derive(Debug, Clone)]
pub struct SubstitutionConfig {
    pub allow_list: AllowList,
    pub ignore_other: bool,
    pub allow_missing: bool,
    pub verbose: bool,
    pub prefix: String,
    pub missing_literal: String,
}

impl Default for SubstitutionConfig {
    fn default() -> Self {
        Self {
            allow_list: AllowList::default(),
            ignore_other: false,
            allow_missing: false,
            verbose: false,
            prefix: DEFAULT_PREFIX.to_string(),
            missing_literal: MISSING_VALUE_LITERAL.to_string(),
        }
    }
}

/// Batch-level switches that do not affect how a single file is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub rollback: bool,
    pub progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            rollback: false,
            progress: true,
        }
    }
}
