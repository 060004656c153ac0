//! Logging system configuration and initialization
//!
//! Console logging through `tracing_subscriber` with an `EnvFilter`, plus an
//! optional non-blocking rolling log file. The log directory comes from the
//! logging config; nothing is derived from the executable location.

use anyhow::{anyhow, Result};
use chrono::Utc;
use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::fmt::{self, time::FormatTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

// Keeps the non-blocking file writer alive for the process lifetime.
static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

pub use crate::infrastructure::config::LoggingConfig;

struct UtcTimeFormatter;

impl FormatTime for UtcTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Initialize the logging system with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Initialize logging per config. `RUST_LOG` overrides the configured level.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let console_layer = fmt::layer()
        .with_timer(UtcTimeFormatter)
        .with_target(true);

    if config.log_to_file {
        let log_dir = config
            .log_dir
            .as_ref()
            .ok_or_else(|| anyhow!("log_to_file is set but log_dir is not configured"))?;
        std::fs::create_dir_all(log_dir)
            .map_err(|e| anyhow!("failed to create log directory {}: {}", log_dir.display(), e))?;

        let appender = rolling::daily(log_dir, "grs-crawler.log");
        let (writer, guard) = non_blocking(appender);
        let _ = LOG_GUARD.set(guard);

        let file_layer = fmt::layer()
            .with_timer(UtcTimeFormatter)
            .with_writer(writer)
            .with_ansi(false);

        Registry::default()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| anyhow!("failed to initialize logging: {}", e))?;
    } else {
        Registry::default()
            .with(filter)
            .with(console_layer)
            .try_init()
            .map_err(|e| anyhow!("failed to initialize logging: {}", e))?;
    }

    Ok(())
}
