//! Error taxonomy of the recommendation engine

use crate::types::MovieId;
use thiserror::Error;

/// A title lookup against the catalog failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Title not found in catalog: '{title}'")]
pub struct NotFoundError {
    pub title: String,
}

/// Malformed input rejected while building the stores
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Duplicate movie id {0}")]
    DuplicateMovieId(MovieId),

    #[error("Movie {0} has an empty title")]
    EmptyTitle(MovieId),

    #[error("{table} row references unknown movie {movie_id}")]
    UnknownMovie {
        table: &'static str,
        movie_id: MovieId,
    },

    #[error("Duplicate genome tag id {0}")]
    DuplicateGenomeTag(u32),

    #[error("Genome score row references unknown tag id {0}")]
    UnknownGenomeTag(u32),

    #[error("Relevance {relevance} for movie {movie_id} is outside [0, 1]")]
    RelevanceOutOfRange { movie_id: MovieId, relevance: f32 },

    #[error("Rating {score} for movie {movie_id} is outside [{min}, {max}]")]
    RatingOutOfRange {
        movie_id: MovieId,
        score: f32,
        min: f32,
        max: f32,
    },

    #[error("Invalid rating scale [{min}, {max}]")]
    InvalidScale { min: f32, max: f32 },

    #[error("Invalid timestamp {0}")]
    InvalidTimestamp(i64),

    #[error("Failed to read {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
}

/// The collaborative model could not be trained
///
/// Cloneable so that a cached training failure can be handed to every caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelTrainingError {
    #[error("Rating matrix is empty")]
    EmptyRatings,

    #[error("Invalid model configuration: {0}")]
    InvalidConfig(String),

    #[error("Normal equations for {factor} row {index} are not positive definite")]
    NotPositiveDefinite { factor: &'static str, index: usize },

    #[error("Model has not been trained")]
    NotTrained,
}

/// Reasons a recommendation request produced no answer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecommendError {
    #[error("Could not resolve seed title '{title}'")]
    Resolution { title: String },

    #[error("Catalog has only {available} eligible movies, {requested} requested")]
    InsufficientCatalog { requested: usize, available: usize },

    #[error("Collaborative model unavailable: {0}")]
    ModelTraining(#[from] ModelTrainingError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Ranked movie {0} has no catalog title")]
    UnknownMovie(MovieId),
}

impl From<NotFoundError> for RecommendError {
    fn from(err: NotFoundError) -> Self {
        RecommendError::Resolution { title: err.title }
    }
}

/// Result type alias for recommendation requests
pub type Result<T> = std::result::Result<T, RecommendError>;
