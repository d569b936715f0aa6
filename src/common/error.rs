//! Error handling module
//!
//! This module defines the error types and result type aliases used in the application.

use thiserror::Error;
use std::io;

/// Tunnel relay error type
///
/// Every variant except `Bind` and `Config` is terminal for a single
/// connection only; the listener and all other connections are unaffected.
#[derive(Error, Debug)]
pub enum RelayError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Cannot acquire the listening endpoint; fatal at startup
    #[error("Bind error: {0}")]
    Bind(String),

    /// Malformed or absent routing token in the connection's opening bytes
    #[error("Routing key extraction failed: {0}")]
    Extraction(String),

    /// Valid routing key with no entry in the route table
    #[error("No route for key '{0}'")]
    UnknownKey(String),

    /// Backend unreachable, refused, or connect timed out; never retried
    #[error("Dial error: {0}")]
    Dial(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias
///
/// This is a `Result` type alias that uses our custom `RelayError`.
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        // Test IO error conversion
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let relay_err: RelayError = io_err.into();

        match relay_err {
            RelayError::Io(_) => {}
            _ => panic!("Should convert to IO error"),
        }
    }

    #[test]
    fn test_error_display() {
        // Test error display
        let err = RelayError::Config("Invalid configuration".to_string());
        let err_str = format!("{}", err);
        assert!(err_str.contains("Invalid configuration"));

        let err = RelayError::UnknownKey("stranger".to_string());
        let err_str = format!("{}", err);
        assert!(err_str.contains("stranger"));
    }
}
