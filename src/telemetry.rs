use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::stderr_buffer::BufferedStderr;

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(
                    f,
                    "invalid log level/filter '{}': unable to build EnvFilter",
                    value
                )
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Pick the filter: RUST_LOG wins, then `--verbose`, then the configured level.
fn filter_directive(verbose: bool, log_level: &str) -> String {
    if verbose {
        "risk_lens=debug,info".to_string()
    } else {
        log_level.to_string()
    }
}

/// Install the global subscriber. Output goes through the stderr buffer so the
/// TUI can hold log lines back while it owns the terminal.
pub fn init(verbose: bool, log_level: &str) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let value = filter_directive(verbose, log_level);
            EnvFilter::try_new(&value).map_err(|source| TelemetryError::EnvFilter { value, source })?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .with_writer(BufferedStderr)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
