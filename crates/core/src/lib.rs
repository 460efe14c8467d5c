//! # CineRec Core
//!
//! Shared building blocks for the CineRec movie recommender.
//!
//! ## Modules
//!
//! - `config`: environment-driven configuration loading and validation
//! - `error`: the core error type
//! - `math`: dense and sparse vector operations
//! - `observability`: structured logging initialisation

pub mod config;
pub mod error;
pub mod math;
pub mod observability;

// Re-export commonly used types
pub use config::{env_key, load_dotenv, parse_env_var, ConfigLoader, ENV_PREFIX};
pub use error::CoreError;
pub use math::{cosine_similarity, dot_product, l2_norm, SparseVector};
pub use observability::{init_logging, LogConfig, LogFormat};

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
