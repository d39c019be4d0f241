//! Error types for the stockwatch application.

use crate::api::ApiError;
use thiserror::Error;

/// The main error type for stockwatch.
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal/TUI related errors
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Market data API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Channel communication errors
    #[error("Channel error: {0}")]
    Channel(String),

    /// Invalid input or state
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network connectivity errors
    #[error("Network error: {0}")]
    Network(String),

    /// Generic application error
    #[error("{0}")]
    Application(String),
}

/// Alias for Result with our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new terminal error.
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Create a new config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new channel error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    /// Create a new invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new application error.
    pub fn application(msg: impl Into<String>) -> Self {
        Self::Application(msg.into())
    }

    /// Check if this error is recoverable (user can retry).
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Channel(_) => true,
            Self::Api(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Check if this error indicates the device or backend is unreachable.
    pub fn is_offline(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api(err) => err.is_offline(),
            _ => false,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;

    #[test]
    fn test_network_errors_are_recoverable() {
        assert!(Error::network("down").is_recoverable());
        assert!(Error::network("down").is_offline());
        assert!(!Error::config("bad").is_recoverable());
    }

    #[test]
    fn test_api_errors_delegate_classification() {
        let err = Error::from(ApiError::new(ApiErrorKind::Network, "unreachable"));
        assert!(err.is_offline());
        assert!(err.is_recoverable());

        let err = Error::from(ApiError::new(ApiErrorKind::NotFound, "missing"));
        assert!(!err.is_offline());
        assert!(!err.is_recoverable());
    }
}
