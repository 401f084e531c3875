//! Unified infrastructure error type.

use thiserror::Error;

/// The error type returned by the crate's fallible start-up and serving
/// operations.
///
/// Application-level failures (conflicts, validation, not-found) are
/// [`ControllerError`](crate::ControllerError)s and end up as HTTP responses.
/// This type surfaces infrastructure failures: loading configuration,
/// binding to a port, accepting a connection.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid socket address `{0}`")]
    InvalidAddress(String),

    #[error("unsupported failure status {0}")]
    InvalidStatus(u16),
}
