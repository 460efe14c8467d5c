//! Recommendation facade
//!
//! Builds both engines once over shared, read-only stores and answers
//! three-seed requests:
//!
//! 1. Resolve seed titles to catalog ids (repeated titles collapse)
//! 2. Score every other catalog movie with the chosen engine
//! 3. Rank, drop seeds, keep the top N
//! 4. Map ids back to titles

use crate::catalog::CatalogStore;
use crate::collaborative::CollaborativeFilteringEngine;
use crate::config::RecommenderConfig;
use crate::content_based::ContentBasedEngine;
use crate::error::{ModelTrainingError, RecommendError, Result};
use crate::profile::{FavoritesProfile, SEED_COUNT};
use crate::ranking::RankAndSelect;
use crate::ratings::RatingStore;
use crate::types::{ScoredMovie, Strategy};
use std::sync::Arc;
use tracing::{debug, debug_span};

/// Entry point for recommendation requests
pub struct Recommender {
    catalog: Arc<CatalogStore>,
    ratings: Arc<RatingStore>,
    content: ContentBasedEngine,
    collaborative: CollaborativeFilteringEngine,
}

impl Recommender {
    /// Build the content engine now; the collaborative model trains on first
    /// use or on [`Self::warm_up`]
    pub fn new(
        catalog: Arc<CatalogStore>,
        ratings: Arc<RatingStore>,
        config: &RecommenderConfig,
    ) -> Self {
        let content = ContentBasedEngine::new(Arc::clone(&catalog), config.content);
        let collaborative = CollaborativeFilteringEngine::with_config(
            Arc::clone(&catalog),
            Arc::clone(&ratings),
            config.collaborative.clone(),
        );

        Self {
            catalog,
            ratings,
            content,
            collaborative,
        }
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn ratings(&self) -> &RatingStore {
        &self.ratings
    }

    pub fn content_engine(&self) -> &ContentBasedEngine {
        &self.content
    }

    pub fn collaborative_engine(&self) -> &CollaborativeFilteringEngine {
        &self.collaborative
    }

    /// Train the collaborative model now
    pub fn warm_up(&self) -> std::result::Result<(), ModelTrainingError> {
        self.collaborative.warm_up()
    }

    pub fn collaborative_ready(&self) -> bool {
        self.collaborative.is_trained()
    }

    /// All catalog titles in catalog order
    pub fn titles(&self) -> Vec<&str> {
        self.catalog.titles()
    }

    pub fn search_titles(&self, query: &str, limit: usize) -> Vec<&str> {
        self.catalog.search_titles(query, limit)
    }

    /// Top `top_n` titles for three seed titles, best first
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` when `top_n` is zero
    /// - `Resolution` naming the first seed title missing from the catalog
    /// - `ModelTraining` for collaborative requests when the model failed to train
    /// - `InsufficientCatalog` for collaborative requests when fewer than
    ///   `top_n` non-seed movies exist
    pub fn recommend<S: AsRef<str>>(
        &self,
        seed_titles: &[S; SEED_COUNT],
        top_n: usize,
        strategy: Strategy,
    ) -> Result<Vec<String>> {
        let ranked = self.recommend_scored(seed_titles, top_n, strategy)?;
        RankAndSelect::titles(&ranked, &self.catalog)
    }

    /// Like [`Self::recommend`] but keeps ids and scores
    pub fn recommend_scored<S: AsRef<str>>(
        &self,
        seed_titles: &[S; SEED_COUNT],
        top_n: usize,
        strategy: Strategy,
    ) -> Result<Vec<ScoredMovie>> {
        let span = debug_span!("recommend", %strategy, top_n);
        let _guard = span.enter();

        if top_n == 0 {
            return Err(RecommendError::InvalidRequest(
                "top_n must be at least 1".to_string(),
            ));
        }

        let profile = FavoritesProfile::from_titles(&self.catalog, seed_titles)?;

        let candidates = match strategy {
            Strategy::Content => self.content.score_candidates(&profile),
            Strategy::Collaborative => {
                // A cached training failure takes precedence over the shortage check
                self.collaborative.warm_up()?;
                let available = self.catalog.len() - profile.len();
                if available < top_n {
                    return Err(RecommendError::InsufficientCatalog {
                        requested: top_n,
                        available,
                    });
                }
                self.collaborative.score_candidates(&profile)?
            }
        };

        let ranked = RankAndSelect::execute(candidates, profile.seeds(), top_n);

        debug!(
            seeds = profile.len(),
            results = ranked.len(),
            "Recommendation request served"
        );

        Ok(ranked)
    }
}
