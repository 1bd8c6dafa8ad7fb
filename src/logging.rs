use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "stylefeed.log";

/// Routes tracing output to `<log_dir>/stylefeed.log`. Stdout belongs to the
/// command output. `RUST_LOG` overrides the default level.
///
/// The returned guard flushes the writer on drop; keep it alive for the
/// whole program.
pub fn init(log_dir: &Path, verbose: bool) -> Result<(WorkerGuard, PathBuf)> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let default_level = if verbose { "stylefeed=debug" } else { "stylefeed=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;

    Ok((guard, log_dir.join(LOG_FILE)))
}
