use crate::models::error::SError;
use camino::Utf8Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "addon_keeper.log";

/// Installs the global subscriber: stderr plus a daily-rolling file in `log_dir`.
///
/// The level comes from `RUST_LOG` (default `info`). Keep the returned guard alive for
/// the lifetime of the process or buffered file output is lost.
pub fn init(log_dir: &Utf8Path) -> Result<WorkerGuard, SError> {
    std::fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()
        .map_err(|e| SError::Unexpected(Some(format!("logging already initialized: {e}"))))?;

    Ok(guard)
}
