//! Logging configuration with journald support on Linux.
//!
//! Listings log at `debug`, store failures at `error`. On Linux the journal
//! is preferred; otherwise logs go to a daily file in the data directory.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system.
///
/// Log level is read from the `GALLERIST_LOG` environment variable using
/// `EnvFilter` syntax, e.g. `GALLERIST_LOG=gallerist=debug`. Defaults to
/// `info`.
pub fn init(log_dir: Option<PathBuf>) -> Result<()> {
    let env_filter = EnvFilter::try_from_env("GALLERIST_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(target_os = "linux")]
    {
        if let Ok(journald_layer) = tracing_journald::layer() {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(journald_layer)
                .init();

            tracing::info!("Logging initialized with journald backend");
            return Ok(());
        }
    }

    let log_dir = resolve_log_dir(log_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "gallerist.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Only init() is expected to run once per process; keep the worker alive
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!("Logging initialized with file backend at {:?}", log_dir);
    Ok(())
}

/// An explicit directory wins; otherwise `<data_local_dir>/gallerist/logs`.
fn resolve_log_dir(log_dir: Option<PathBuf>) -> PathBuf {
    log_dir.unwrap_or_else(default_log_dir)
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gallerist")
        .join("logs")
}
