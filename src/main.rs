//! envstamp - replace `process.env.NAME` references in built files at container start-up.
//!
//! # Execution Flow
//!
//! 1. Parse arguments ([`Cli`])
//! 2. Initialize logging (stderr, plus a rotating file with `--log-dir`)
//! 3. Resolve configuration: CLI flags > `envstamp.yaml` > defaults
//! 4. Capture the process environment once
//! 5. Run the substitution or rollback batch on a single-threaded tokio runtime
//! 6. Print the summary; exit 1 if any file failed

use anyhow::{Context, Result};
use clap::Parser;
use envstamp::cli::{Cli, ConsoleProgress, change_lines, summary_lines};
use envstamp::services::{EnvSnapshot, NoProgress, ProgressReporter};
use envstamp::{APP_NAME, BatchRunner, ConfigManager, Operation, SubstitutionService, VERSION};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Keep the guard alive until exit so file logs are flushed
    let _log_guard = envstamp::logging::setup_logging(cli.debug, cli.log_dir.as_deref())?;

    tracing::debug!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = ConfigManager::new(cli.config.as_deref());

    if cli.init_config {
        config_manager.write_default_settings()?;
        println!("Wrote {}", config_manager.settings_path());
        return Ok(ExitCode::SUCCESS);
    }

    let (config, options) = config_manager.resolve(&cli.overrides())?;

    let operation = if options.rollback {
        Operation::Rollback
    } else {
        Operation::Substitute
    };

    let service = SubstitutionService::new(config).context("Invalid reference prefix")?;
    let progress: Arc<dyn ProgressReporter> = if options.progress {
        Arc::new(ConsoleProgress)
    } else {
        Arc::new(NoProgress)
    };
    let runner =
        BatchRunner::new(service, Arc::new(EnvSnapshot::capture())).with_progress(progress);

    // All file operations interleave on one thread while waiting on I/O
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let report = runtime.block_on(runner.run_all(&cli.files, operation));

    if cli.verbose {
        for (path, outcome) in cli.files.iter().zip(&report.outcomes) {
            for line in change_lines(path, outcome) {
                println!("{}", line);
            }
        }
    }

    let summary = summary_lines(&cli.files, &report, options.rollback);
    if report.has_failures() {
        summary.iter().for_each(|line| eprintln!("{}", line));
        Ok(ExitCode::FAILURE)
    } else {
        summary.iter().for_each(|line| println!("{}", line));
        Ok(ExitCode::SUCCESS)
    }
}
