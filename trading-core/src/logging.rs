// src/logging.rs
// Console + append-only file logging on top of tracing

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::config::Logging;
use crate::service::ServiceError;

const QUIET_DEPENDENCIES: &str = "hyper=warn,reqwest=warn";

/// Installs the global subscriber.
///
/// The console follows `RUST_LOG` when set, otherwise the configured level
/// (`debug` with `verbose`). The log file always records debug and above.
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init_logging(config: &Logging, verbose: bool) -> Result<WorkerGuard, ServiceError> {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},{}", level, QUIET_DEPENDENCIES)));

    let path = Path::new(&config.file);
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| ServiceError::Config(format!("Invalid log file path: {}", config.file)))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_filter(EnvFilter::new(format!("debug,{}", QUIET_DEPENDENCIES)));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ServiceError::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(guard)
}
