//! Tracing setup: compact console output plus daily JSON log files

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE: &str = "ema-alert.log";

/// Installs the global subscriber. Keep the returned guard alive for the
/// life of the process or buffered file lines are lost.
pub fn init_tracing() -> Result<WorkerGuard> {
    std::fs::create_dir_all(LOG_DIR)?;

    let file_appender = tracing_appender::rolling::daily(LOG_DIR, LOG_FILE);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .compact();

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .json()
        .with_current_span(false)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()?;

    Ok(guard)
}
