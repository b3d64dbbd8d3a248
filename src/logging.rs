//! Tracing setup for the command-line front end.

use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding per-target log levels.
pub const LOG_ENV: &str = "SCREENSHOT_ORGANIZER_LOG";

/// Prefix of the daily log files, e.g. `screenshot-organizer.2024-05-01.log`.
pub const LOG_FILE_PREFIX: &str = "screenshot-organizer";

/// Installs the global subscriber: stderr plus a daily file in
/// `log_directory`.
///
/// Falls back to `screenshot_organizer=info` if `SCREENSHOT_ORGANIZER_LOG` is
/// unset or invalid. If the log directory can't be used, only stderr is
/// logged to. Keep the returned guard alive until exit so buffered file
/// lines are flushed.
pub fn init_logging(log_directory: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("screenshot_organizer=info"));

    let (file_layer, guard, file_error) = match daily_appender(log_directory) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init();

    if installed.is_err() {
        // Another subscriber (e.g. a test harness) is already in place.
        return guard;
    }
    if let Some(e) = file_error {
        tracing::warn!(
            "file logging disabled, cannot use {}: {e}",
            log_directory.display()
        );
    } else {
        tracing::debug!("writing logs to {}", log_directory.display());
    }

    guard
}

fn daily_appender(log_directory: &Path) -> Result<RollingFileAppender, String> {
    fs::create_dir_all(log_directory).map_err(|e| e.to_string())?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(log_directory)
        .map_err(|e| e.to_string())
}
