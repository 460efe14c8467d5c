//! Collaborative filtering
//!
//! Trains an ALS model over the rating store once, then answers each request by
//! folding in a synthetic user who gave every seed the top score.

use crate::catalog::CatalogStore;
use crate::error::ModelTrainingError;
use crate::matrix_factorization::{ALSConfig, MatrixFactorization, SparseMatrix};
use crate::profile::FavoritesProfile;
use crate::ratings::RatingStore;
use crate::types::{MovieId, ScoredMovie};
use cinerec_core::cosine_similarity;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Collaborative Filtering Engine
pub struct CollaborativeFilteringEngine {
    catalog: Arc<CatalogStore>,
    ratings: Arc<RatingStore>,
    als_config: ALSConfig,
    /// Outcome of the one training run, success or failure
    model: OnceLock<Result<Arc<MatrixFactorization>, ModelTrainingError>>,
}

impl CollaborativeFilteringEngine {
    pub fn new(catalog: Arc<CatalogStore>, ratings: Arc<RatingStore>) -> Self {
        Self::with_config(catalog, ratings, ALSConfig::default())
    }

    pub fn with_config(
        catalog: Arc<CatalogStore>,
        ratings: Arc<RatingStore>,
        als_config: ALSConfig,
    ) -> Self {
        Self {
            catalog,
            ratings,
            als_config,
            model: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &ALSConfig {
        &self.als_config
    }

    /// Preferences in (0, 1]: each score divided by the scale maximum
    pub fn build_user_item_matrix(&self, model: &mut MatrixFactorization) -> SparseMatrix {
        let scale = self.ratings.scale();
        model.build_matrix(
            self.ratings
                .iter()
                .map(|r| (r.user_id, r.movie_id, scale.preference(r.score))),
        )
    }

    /// Train a fresh model, bypassing the cache
    pub fn train(&self) -> Result<MatrixFactorization, ModelTrainingError> {
        let started = Instant::now();
        let mut model = MatrixFactorization::new(self.als_config.clone());
        let matrix = self.build_user_item_matrix(&mut model);

        info!(
            users = matrix.num_users,
            items = matrix.num_items,
            interactions = matrix.nnz(),
            latent_factors = self.als_config.latent_factors,
            "Training collaborative model"
        );

        model.fit(&matrix)?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Collaborative model trained"
        );
        Ok(model)
    }

    /// The trained model, training it on first use
    ///
    /// Concurrent first callers block on the one in-flight training run and
    /// share its outcome. A failure is cached like a success.
    pub fn model(&self) -> Result<Arc<MatrixFactorization>, ModelTrainingError> {
        self.model
            .get_or_init(|| {
                self.train().map(Arc::new).map_err(|e| {
                    warn!(error = %e, "Collaborative model training failed");
                    e
                })
            })
            .clone()
    }

    /// Train eagerly so a failure surfaces at startup
    pub fn warm_up(&self) -> Result<(), ModelTrainingError> {
        self.model().map(|_| ())
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.model.get(), Some(Ok(_)))
    }

    /// Affinity of every non-seed catalog movie to the seeds, in catalog order
    ///
    /// Movies nobody rated have no item factors and score negative infinity.
    pub fn score_candidates(
        &self,
        profile: &FavoritesProfile,
    ) -> Result<Vec<ScoredMovie>, ModelTrainingError> {
        let model = self.model()?;
        let scale = self.ratings.scale();
        let top_preference = scale.preference(scale.max_score);

        let seeds: Vec<(MovieId, f32)> = profile
            .seeds()
            .iter()
            .map(|&id| (id, top_preference))
            .collect();
        let user_vector = model.fold_in(&seeds)?;
        let affinities: HashMap<MovieId, f32> =
            model.score_items(user_vector.view())?.into_iter().collect();

        let scored: Vec<ScoredMovie> = self
            .catalog
            .movies()
            .filter(|movie| !profile.contains(movie.id))
            .map(|movie| {
                let score = affinities
                    .get(&movie.id)
                    .copied()
                    .unwrap_or(f32::NEG_INFINITY);
                ScoredMovie::new(movie.id, score)
            })
            .collect();

        debug!(
            seeds = seeds.len(),
            rated_seeds = profile
                .seeds()
                .iter()
                .filter(|id| self.ratings.rating_count(**id) > 0)
                .count(),
            candidates = scored.len(),
            "Collaborative candidates scored"
        );

        Ok(scored)
    }

    /// Movies whose item factors point the same way as `movie_id`'s
    pub fn similar_items(
        &self,
        movie_id: MovieId,
        limit: usize,
    ) -> Result<Vec<ScoredMovie>, ModelTrainingError> {
        let model = self.model()?;
        let Some(source) = model.item_embedding(movie_id) else {
            return Ok(Vec::new());
        };

        let mut similar: Vec<ScoredMovie> = model
            .item_ids()
            .iter()
            .filter(|&&other| other != movie_id)
            .filter_map(|&other| {
                model
                    .item_embedding(other)
                    .map(|embedding| ScoredMovie::new(other, cosine_similarity(&source, &embedding)))
            })
            .collect();

        crate::ranking::sort_by_score(&mut similar);
        similar.truncate(limit);
        Ok(similar)
    }
}
