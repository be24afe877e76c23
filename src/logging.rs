use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn default_filter(debug_mode: bool) -> EnvFilter {
    build_filter(std::env::var("RUST_LOG").ok().as_deref(), debug_mode)
}

/// A non-empty, valid `RUST_LOG` always wins. Otherwise debug mode logs at
/// debug level and the default is warn, so progress lines stay readable.
fn build_filter(rust_log: Option<&str>, debug_mode: bool) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(if debug_mode { "debug" } else { "warn" }))
}

/// Setup logging to stderr, plus a daily rotating file when `log_dir` is given.
///
/// # Arguments
/// * `debug_mode` - If true and `RUST_LOG` is unset, log at debug level; otherwise default to warn
/// * `log_dir` - Optional directory for `envstamp.<date>` log files
///
/// # Returns
/// A guard that must be held for the duration of the program to keep file logging active
pub fn setup_logging(debug_mode: bool, log_dir: Option<&Utf8Path>) -> Result<Option<WorkerGuard>> {
    let Some(log_dir) = log_dir else {
        // Ignore the error if a subscriber is already installed (tests)
        let _ = tracing_subscriber::registry()
            .with(default_filter(debug_mode))
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init();
        return Ok(None);
    };

    if !log_dir.exists() {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }

    let file_appender = rolling::daily(log_dir, "envstamp");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let _ = tracing_subscriber::registry()
        .with(default_filter(debug_mode))
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();

    tracing::info!(
        "Logging initialized: dir={}, debug={}",
        log_dir,
        debug_mode
    );

    Ok(Some(guard))
}
