//! Logging setup.

use risk_config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix of the rolling log file.
const LOG_FILE_PREFIX: &str = "riskctl.log";

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Console output
/// goes to stderr so stdout stays free for reports. When `config.file` is
/// set, JSON lines are also written to a daily rolling file in that
/// directory; keep the returned guard alive to flush it.
pub fn setup_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let json = config.format == "json";
    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let pretty_layer = (!json).then(|| fmt::layer().pretty().with_writer(std::io::stderr));

    let (file_layer, guard) = match &config.file {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().json().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(file_layer)
        .init();

    guard
}
