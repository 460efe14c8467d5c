//! Structured logging initialisation
//!
//! Services log through `tracing`; this module installs the subscriber once at
//! startup. JSON output is the default for services, a human-readable format is
//! available for local runs.

use crate::config::{env_key, parse_env_var, ConfigLoader};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Logging configuration
///
/// # Environment Variables
///
/// - `CINEREC_SERVICE_NAME` (optional): service identifier (default: "cinerec")
/// - `CINEREC_LOG_LEVEL` or `RUST_LOG` (optional): filter directive (default: "info")
/// - `CINEREC_LOG_FORMAT` (optional): `json` or `pretty` (default: "json")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub service_name: String,
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "cinerec".to_string(),
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl ConfigLoader for LogConfig {
    fn from_env() -> Result<Self, CoreError> {
        let defaults = LogConfig::default();

        let service_name =
            std::env::var(env_key("SERVICE_NAME")).unwrap_or(defaults.service_name);

        let level = std::env::var(env_key("LOG_LEVEL"))
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(defaults.level);

        let format = parse_env_var(&env_key("LOG_FORMAT"), defaults.format)?;

        Ok(Self {
            service_name,
            level,
            format,
        })
    }

    fn validate(&self) -> Result<(), CoreError> {
        // Full filter directives ("cinerec_engine=debug,info") are accepted as-is;
        // a bare word must be a known level.
        let level = self.level.trim().to_lowercase();
        let is_directive = level.contains('=') || level.contains(',');
        if !is_directive && !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(CoreError::config(
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
                env_key("LOG_LEVEL"),
            ));
        }

        if self.service_name.trim().is_empty() {
            return Err(CoreError::config(
                "service_name must not be empty",
                env_key("SERVICE_NAME"),
            ));
        }

        Ok(())
    }
}

/// Install the global tracing subscriber
///
/// Must be called once at startup; a second call fails with
/// `ObservabilityError`.
pub fn init_logging(config: &LogConfig) -> Result<(), CoreError> {
    config.validate()?;

    let env_filter = EnvFilter::try_new(&config.level)
        .map_err(|e| CoreError::config(e.to_string(), env_key("LOG_LEVEL")))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true),
            )
            .try_init(),
    };
    result.map_err(|e| CoreError::ObservabilityError(e.to_string()))?;

    tracing::info!(
        service_name = %config.service_name,
        level = %config.level,
        format = %config.format,
        "Logging initialized"
    );

    Ok(())
}
