//! Command-line surface and console reporting.
//!
//! Parsing produces [`Cli`]; everything else in this module only prints.

use crate::config::Overrides;
use crate::models::{BatchReport, OperationOutcome};
use crate::services::ProgressReporter;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "envstamp")]
#[command(version = crate::VERSION)]
#[command(about = "Replace process.env references in built files with runtime environment values")]
#[command(after_help = "\
Every rewritten file keeps its original content in <file>.envs until it is \
rolled back with --rollback.")]
pub struct Cli {
    /// Files to process (usually expanded by the shell)
    #[arg(required_unless_present = "init_config")]
    pub files: Vec<Utf8PathBuf>,

    /// Print every replacement with its line and column
    #[arg(short, long)]
    pub verbose: bool,

    /// Comma-separated allow-list of variable names; `*` matches any characters
    #[arg(long, value_name = "LIST")]
    pub vars: Option<String>,

    /// Leave references outside the allow-list unreplaced instead of failing
    #[arg(long, visible_alias = "allow-unreplaced")]
    pub ignore_other: bool,

    /// Replace unset variables with `undefined` instead of failing
    #[arg(long)]
    pub allow_missing: bool,

    /// Restore files from their .envs backups
    #[arg(long)]
    pub rollback: bool,

    /// Verbose internal logging
    #[arg(long)]
    pub debug: bool,

    /// Do not print a status line per file
    #[arg(long)]
    pub no_progress: bool,

    /// Settings file (default: ./envstamp.yaml if present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Also write logs to a daily rotating file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<Utf8PathBuf>,

    /// Write a default settings file and exit
    #[arg(long)]
    pub init_config: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            vars: self.vars.clone(),
            ignore_other: self.ignore_other,
            allow_missing: self.allow_missing,
            verbose: self.verbose,
            rollback: self.rollback,
            no_progress: self.no_progress,
        }
    }
}

/// Prints one line per file as soon as it settles.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn report(&self, _index: usize, path: &Utf8Path, outcome: &OperationOutcome) {
        if outcome.is_failed() {
            eprintln!("{}", progress_line(path, outcome));
        } else {
            println!("{}", progress_line(path, outcome));
        }
    }
}

pub fn progress_line(path: &Utf8Path, outcome: &OperationOutcome) -> String {
    format!("[{}] {}: {}", outcome.label(), path, outcome.summary())
}

/// Lines describing every changed reference, `path:line:column old -> new`.
pub fn change_lines(path: &Utf8Path, outcome: &OperationOutcome) -> Vec<String> {
    match outcome {
        OperationOutcome::Replaced { changes, .. } => changes
            .iter()
            .map(|c| format!("{}:{}:{} {} -> {}", path, c.line, c.column, c.old, c.new))
            .collect(),
        _ => Vec::new(),
    }
}

/// `1 file`, `2 files`, `0 files`.
fn count_noun(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Final summary lines for a batch.
pub fn summary_lines(paths: &[Utf8PathBuf], report: &BatchReport, rollback: bool) -> Vec<String> {
    let mut lines = Vec::new();

    for failure in &report.failures {
        lines.push(format!("error: {}: {}", failure.path, failure.message));
    }

    if rollback {
        lines.push(format!(
            "Rolled back {} of {} ({} failed)",
            report.rolled_back_count(),
            count_noun(paths.len(), "file"),
            report.failures.len()
        ));
        return lines;
    }

    lines.push(format!(
        "Replaced {} in {} of {} ({} failed)",
        count_noun(report.total_replacements(), "reference"),
        report.replaced_count(),
        count_noun(paths.len(), "file"),
        report.failures.len()
    ));

    if report.has_failures() && report.replaced_count() > 0 {
        let modified = report.replaced_count();
        lines.push(format!(
            "{} {} modified. Run `envstamp --rollback <files>` with the same files to restore them.",
            count_noun(modified, "file"),
            if modified == 1 { "was" } else { "were" }
        ));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatchFailure, OperationError, ReplacementCounts, ReplacementRecord};
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "envstamp",
            "--vars",
            "API_URL,NEXT_PUBLIC_*",
            "--allow-unreplaced",
            "--no-progress",
            "a.js",
            "b.js",
        ]);

        assert_eq!(cli.files.len(), 2);
        assert!(cli.ignore_other);
        assert!(cli.no_progress);
        assert_eq!(cli.overrides().vars.as_deref(), Some("API_URL,NEXT_PUBLIC_*"));
    }

    #[test]
    fn test_files_required() {
        assert!(Cli::try_parse_from(["envstamp"]).is_err());
        assert!(Cli::try_parse_from(["envstamp", "--init-config"]).is_ok());
    }

    #[test]
    fn test_change_lines() {
        let outcome = OperationOutcome::Replaced {
            counts: ReplacementCounts::new(),
            total: 1,
            changes: vec![ReplacementRecord {
                line: 3,
                column: 7,
                old: "process.env.X".to_string(),
                new: "\"x\"".to_string(),
            }],
        };

        assert_eq!(
            change_lines(Utf8Path::new("main.js"), &outcome),
            vec!["main.js:3:7 process.env.X -> \"x\"".to_string()]
        );
    }

    #[test]
    fn test_summary_mentions_rollback_on_partial_failure() {
        let paths = vec![Utf8PathBuf::from("a.js"), Utf8PathBuf::from("b.js")];
        let report = BatchReport {
            outcomes: vec![
                OperationOutcome::Replaced {
                    counts: ReplacementCounts::new(),
                    total: 2,
                    changes: Vec::new(),
                },
                OperationOutcome::Failed {
                    error: OperationError::TaskFailed("boom".to_string()),
                },
            ],
            failures: vec![BatchFailure {
                index: 1,
                path: Utf8PathBuf::from("b.js"),
                message: "boom".to_string(),
            }],
            ..Default::default()
        };

        let lines = summary_lines(&paths, &report, false);
        assert!(lines[0].starts_with("error: b.js"));
        assert!(lines.iter().any(|l| l.starts_with("1 file was modified.")));
        assert!(lines.iter().any(|l| l.contains("--rollback")));
        assert!(lines.iter().any(|l| l.starts_with("Replaced 2 references in 1 of 2 files")));
    }

    #[test]
    fn test_count_noun_pluralizes() {
        assert_eq!(count_noun(0, "file"), "0 files");
        assert_eq!(count_noun(1, "file"), "1 file");
        assert_eq!(count_noun(3, "reference"), "3 references");
    }
}
