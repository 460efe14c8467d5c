//! Error types shared across CineRec crates

use thiserror::Error;

/// Errors raised by the core utilities (configuration and logging setup)
#[derive(Debug, Error)]
pub enum CoreError {
    /// A configuration value is missing, unparsable or out of range
    #[error("Configuration error: {message}")]
    ConfigurationError {
        message: String,
        /// The configuration key that failed, when known
        key: Option<String>,
    },

    /// The tracing subscriber could not be installed
    #[error("Observability error: {0}")]
    ObservabilityError(String),
}

impl CoreError {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        CoreError::ConfigurationError {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// The configuration key associated with this error, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            CoreError::ConfigurationError { key, .. } => key.as_deref(),
            CoreError::ObservabilityError(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_carries_key() {
        let err = CoreError::config("port must be greater than 0", "server.port");
        assert_eq!(err.key(), Some("server.port"));
        assert_eq!(
            err.to_string(),
            "Configuration error: port must be greater than 0"
        );
    }

    #[test]
    fn test_observability_error_has_no_key() {
        let err = CoreError::ObservabilityError("already set".to_string());
        assert!(err.key().is_none());
    }
}
