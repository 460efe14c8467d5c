//! CineRec recommendation engine
//!
//! Turns three favourite movie titles into a ranked list of recommendations,
//! either by content similarity (genres, genome tag relevance, user tags) or by
//! collaborative filtering over historical ratings (ALS with fold-in).

pub mod catalog;
pub mod collaborative;
pub mod config;
pub mod content_based;
pub mod error;
pub mod loader;
pub mod matrix_factorization;
pub mod profile;
pub mod ranking;
pub mod ratings;
pub mod recommendation;
pub mod server;
pub mod types;

// Re-export key types
pub use catalog::{CatalogRecords, CatalogStore};
pub use collaborative::CollaborativeFilteringEngine;
pub use config::RecommenderConfig;
pub use content_based::{ContentBasedEngine, ContentWeights};
pub use error::{DataError, ModelTrainingError, NotFoundError, RecommendError, Result};
pub use loader::DataSet;
pub use matrix_factorization::{ALSConfig, MatrixFactorization, SparseMatrix};
pub use profile::FavoritesProfile;
pub use ranking::RankAndSelect;
pub use ratings::{RatingScale, RatingStore};
pub use recommendation::Recommender;
pub use types::*;

#[cfg(test)]
mod tests;
