//! Tracing setup. Logs go to a file so stdout carries only command output.

use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_FILTER: &str = "pmrview=info,warn";
const LOG_FILE: &str = "pmrview.log";

/// Directory holding the log file.
pub fn log_dir() -> Result<PathBuf> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("pmrview").join("logs"))
}

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init_tracing() -> Result<WorkerGuard> {
  let dir = log_dir()?;
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let subscriber = fmt::Subscriber::builder()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    )
    .with_writer(writer)
    .with_ansi(false)
    .with_target(true)
    .with_line_number(true)
    .finish();

  tracing::subscriber::set_global_default(subscriber)
    .map_err(|e| eyre!("Failed to set tracing subscriber: {}", e))?;

  Ok(guard)
}
