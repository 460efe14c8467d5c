use crate::content_based::ContentWeights;
use crate::matrix_factorization::ALSConfig;
use crate::ratings::RatingScale;
use cinerec_core::{ConfigLoader, CoreError, LogConfig, LogFormat, ENV_PREFIX};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CONFIG_FILE: &str = "config/recommender";

/// Recommender Service Configuration
///
/// Every section falls back to its defaults, so an empty environment yields a
/// working configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Data file locations
    pub data: DataConfig,

    /// Content feature weights
    pub content: ContentWeights,

    /// ALS hyper-parameters
    pub collaborative: ALSConfig,

    /// Rating scale bounds
    pub ratings: RatingScale,

    pub recommendation: RecommendationConfig,

    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,

    /// Server port (default: 8080)
    pub port: u16,

    /// Worker threads
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the CSV files
    pub dir: PathBuf,
    pub movies_file: String,
    pub tags_file: String,
    pub genome_scores_file: String,
    pub genome_tags_file: String,
    pub ratings_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("resources/data"),
            movies_file: "movies.csv".to_string(),
            tags_file: "tags.csv".to_string(),
            genome_scores_file: "genome_scores.csv".to_string(),
            genome_tags_file: "genome_tags.csv".to_string(),
            ratings_file: "train.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// List length used when a request leaves `top_n` out
    pub default_top_n: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self { default_top_n: 10 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `cinerec_engine=debug`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl RecommenderConfig {
    /// Load configuration from the optional `config/recommender` file, then
    /// `CINEREC_*` environment variables (`__` separates sections, e.g.
    /// `CINEREC_SERVER__PORT`)
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(environment: config::Environment) -> Result<Self, CoreError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                environment
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_error)?;

        settings.try_deserialize().map_err(config_error)
    }

    /// Logging settings for the service binary
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            service_name: "cinerec-service".to_string(),
            level: self.logging.level.clone(),
            format: self.logging.format,
        }
    }

    /// Socket address string for the HTTP server
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn config_error(err: config::ConfigError) -> CoreError {
    CoreError::ConfigurationError {
        message: err.to_string(),
        key: None,
    }
}

impl ConfigLoader for RecommenderConfig {
    fn from_env() -> Result<Self, CoreError> {
        Self::load()
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.server.port == 0 {
            return Err(CoreError::config(
                "port must be greater than 0",
                "server.port",
            ));
        }
        if self.server.workers == Some(0) {
            return Err(CoreError::config(
                "workers must be greater than 0 when set",
                "server.workers",
            ));
        }

        let data = &self.data;
        for (key, file) in [
            ("data.movies_file", &data.movies_file),
            ("data.tags_file", &data.tags_file),
            ("data.genome_scores_file", &data.genome_scores_file),
            ("data.genome_tags_file", &data.genome_tags_file),
            ("data.ratings_file", &data.ratings_file),
        ] {
            if file.trim().is_empty() {
                return Err(CoreError::config("file name must not be empty", key));
            }
        }

        if !self.content.is_valid() {
            return Err(CoreError::config(
                "content weights must be finite and non-negative",
                "content",
            ));
        }

        let als = &self.collaborative;
        if als.latent_factors == 0 {
            return Err(CoreError::config(
                "latent_factors must be greater than 0",
                "collaborative.latent_factors",
            ));
        }
        if als.iterations == 0 {
            return Err(CoreError::config(
                "iterations must be greater than 0",
                "collaborative.iterations",
            ));
        }
        if !(als.regularization.is_finite() && als.regularization > 0.0) {
            return Err(CoreError::config(
                format!("regularization must be positive, got {}", als.regularization),
                "collaborative.regularization",
            ));
        }
        if !(als.alpha.is_finite() && als.alpha >= 0.0) {
            return Err(CoreError::config(
                format!("alpha must be non-negative, got {}", als.alpha),
                "collaborative.alpha",
            ));
        }

        if !self.ratings.is_valid() {
            return Err(CoreError::config(
                format!(
                    "rating scale [{}, {}] is invalid",
                    self.ratings.min_score, self.ratings.max_score
                ),
                "ratings",
            ));
        }

        if self.recommendation.default_top_n == 0 {
            return Err(CoreError::config(
                "default_top_n must be greater than 0",
                "recommendation.default_top_n",
            ));
        }

        self.log_config().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load_with(vars: &[(&str, &str)]) -> Result<RecommenderConfig, CoreError> {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RecommenderConfig::load_from(config::Environment::with_prefix(ENV_PREFIX).source(Some(source)))
    }

    #[test]
    fn test_defaults() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.data.dir, PathBuf::from("resources/data"));
        assert_eq!(config.data.ratings_file, "train.csv");
        assert_eq!(config.collaborative, ALSConfig::default());
        assert_eq!(config.recommendation.default_top_n, 10);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_overrides() {
        let config = load_with(&[
            ("CINEREC_SERVER__PORT", "9090"),
            ("CINEREC_DATA__DIR", "/srv/movielens"),
            ("CINEREC_COLLABORATIVE__LATENT_FACTORS", "16"),
            ("CINEREC_CONTENT__USER_TAG_WEIGHT", "0.25"),
            ("CINEREC_LOGGING__FORMAT", "pretty"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.data.dir, PathBuf::from("/srv/movielens"));
        assert_eq!(config.collaborative.latent_factors, 16);
        assert_eq!(config.content.user_tag_weight, 0.25);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.bind_address(), "0.0.0.0:9090");
    }

    #[test]
    fn test_unparsable_value_is_a_configuration_error() {
        let err = load_with(&[("CINEREC_SERVER__PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, CoreError::ConfigurationError { .. }));
    }

    #[test]
    fn test_validate_names_the_key() {
        let mut config = RecommenderConfig::default();
        config.collaborative.regularization = 0.0;
        assert_eq!(
            config.validate().unwrap_err().key(),
            Some("collaborative.regularization")
        );

        let mut config = RecommenderConfig::default();
        config.ratings = RatingScale {
            min_score: 5.0,
            max_score: 0.5,
        };
        assert_eq!(config.validate().unwrap_err().key(), Some("ratings"));

        let mut config = RecommenderConfig::default();
        config.recommendation.default_top_n = 0;
        assert_eq!(
            config.validate().unwrap_err().key(),
            Some("recommendation.default_top_n")
        );

        let mut config = RecommenderConfig::default();
        config.server.port = 0;
        assert_eq!(config.validate().unwrap_err().key(), Some("server.port"));
    }

    #[test]
    fn test_log_config() {
        let log = RecommenderConfig::default().log_config();
        assert_eq!(log.service_name, "cinerec-service");
        assert_eq!(log.level, "info");
    }
}
