use dipwatch_core::config::LogConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "dipwatch.log";

/// # Summary
/// Installs the global tracing subscriber.
///
/// # Logic
/// 1. `RUST_LOG` wins over the configured filter.
/// 2. Human-readable output always goes to stderr, leaving stdout for the console report.
/// 3. With `log.dir` set, a daily rolling file is added through a non-blocking writer.
///
/// # Returns
/// The writer guard when a file is used; it must live until the process exits
/// or buffered lines are lost.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>, String> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| format!("invalid log filter {:?}: {}", config.filter, e))?;

    let (file_layer, guard) = match &config.dir {
        Some(dir) => {
            let (writer, guard) = non_blocking(rolling::daily(dir, LOG_FILE_PREFIX));
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .try_init()
        .map_err(|e| format!("failed to install subscriber: {}", e))?;

    Ok(guard)
}
