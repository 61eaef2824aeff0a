//! Observability for the librarian
//!
//! Structured JSON logs on stderr, one event per line. `RUST_LOG` takes
//! precedence over the configured level.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(#[from] ParseError),

    #[error("Failed to install log subscriber: {0}")]
    Install(String),
}

/// Install the global subscriber
pub fn init_tracing(level: &str) -> Result<(), ObservabilityError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| ObservabilityError::Install(e.to_string()))
}
