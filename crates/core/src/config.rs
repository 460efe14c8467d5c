//! Shared configuration helpers for CineRec crates
//!
//! Configuration is read from environment variables with the `CINEREC_` prefix,
//! optionally seeded from a `.env` file. Crates implement [`ConfigLoader`] for
//! their own configuration structs so every config is loaded and validated the
//! same way.
//!
//! # Example
//!
//! ```no_run
//! use cinerec_core::config::{load_dotenv, ConfigLoader};
//! use cinerec_core::observability::LogConfig;
//!
//! # fn example() -> Result<(), cinerec_core::CoreError> {
//! load_dotenv();
//! let log_config = LogConfig::from_env()?;
//! log_config.validate()?;
//! # Ok(())
//! # }
//! ```

use crate::error::CoreError;

/// Prefix for every CineRec environment variable
pub const ENV_PREFIX: &str = "CINEREC";

/// Configuration loader trait
///
/// Provides standardized methods for loading and validating configuration.
pub trait ConfigLoader: Sized {
    /// Load configuration from the environment, falling back to defaults for
    /// optional values.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if a value is present but cannot be parsed.
    fn from_env() -> Result<Self, CoreError>;

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` naming the offending key.
    fn validate(&self) -> Result<(), CoreError>;
}

/// Parse an environment variable, returning `default` when it is not set
///
/// # Errors
///
/// Returns a `ConfigurationError` if the value is set but cannot be parsed
pub fn parse_env_var<T>(key: &str, default: T) -> Result<T, CoreError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| CoreError::config(format!("Failed to parse {}: {}", key, e), key))
        })
        .unwrap_or(Ok(default))
}

/// Build the full environment variable name for a CineRec setting
///
/// `env_key("LOG_LEVEL")` yields `CINEREC_LOG_LEVEL`.
pub fn env_key(name: &str) -> String {
    format!("{}_{}", ENV_PREFIX, name)
}

/// Load .env file if present
///
/// A missing file is not an error; any other failure is reported on stderr since
/// logging is not initialised yet at this point.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }
}
