//! Content-based filtering implementation
//!
//! Every movie is embedded as one sparse feature vector over a universe fixed at
//! catalog load time:
//!
//! | block          | width                  | value                              |
//! |----------------|------------------------|------------------------------------|
//! | genres         | distinct genres        | `genre_weight` if present          |
//! | genome tags    | genome tags with score | `relevance * relevance_weight`     |
//! | user tags      | distinct user tags     | `user_tag_weight` if present       |
//!
//! Similarity is cosine, clamped to [0, 1], with `similarity(a, a) == 1.0`.

use crate::catalog::CatalogStore;
use crate::profile::FavoritesProfile;
use crate::types::{MovieId, ScoredMovie};
use cinerec_core::SparseVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Relative weight of each feature block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentWeights {
    pub genre_weight: f32,
    pub relevance_weight: f32,
    pub user_tag_weight: f32,
}

impl Default for ContentWeights {
    fn default() -> Self {
        Self {
            genre_weight: 1.0,
            relevance_weight: 1.0,
            user_tag_weight: 0.5,
        }
    }
}

impl ContentWeights {
    pub fn is_valid(&self) -> bool {
        [self.genre_weight, self.relevance_weight, self.user_tag_weight]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0)
    }
}

/// Column layout of the feature space
#[derive(Debug, Clone)]
struct FeatureSpace {
    genres: HashMap<String, u32>,
    genome_tags: HashMap<String, u32>,
    user_tags: HashMap<String, u32>,
    dimension: usize,
}

impl FeatureSpace {
    fn from_catalog(catalog: &CatalogStore) -> Self {
        let mut offset = 0u32;
        let mut block = |labels: &[String]| -> HashMap<String, u32> {
            let columns = labels
                .iter()
                .enumerate()
                .map(|(i, label)| (label.clone(), offset + i as u32))
                .collect();
            offset += labels.len() as u32;
            columns
        };

        let genres = block(catalog.genre_universe());
        let genome_tags = block(catalog.genome_tag_universe());
        let user_tags = block(catalog.user_tag_universe());

        Self {
            genres,
            genome_tags,
            user_tags,
            dimension: offset as usize,
        }
    }
}

/// Content-based recommendation engine
pub struct ContentBasedEngine {
    catalog: Arc<CatalogStore>,
    weights: ContentWeights,
    /// Feature vectors in catalog order
    vectors: Vec<(MovieId, SparseVector)>,
    index: HashMap<MovieId, usize>,
    dimension: usize,
}

impl ContentBasedEngine {
    pub fn new(catalog: Arc<CatalogStore>, weights: ContentWeights) -> Self {
        let space = FeatureSpace::from_catalog(&catalog);

        let vectors: Vec<(MovieId, SparseVector)> = catalog
            .movies()
            .map(|movie| {
                let genres = movie
                    .genres
                    .iter()
                    .filter_map(|g| space.genres.get(g))
                    .map(|&col| (col, weights.genre_weight));
                let relevance = movie.tag_relevance.iter().filter_map(|(tag, &score)| {
                    space
                        .genome_tags
                        .get(tag)
                        .map(|&col| (col, score * weights.relevance_weight))
                });
                let user_tags = movie
                    .tags
                    .iter()
                    .filter_map(|t| space.user_tags.get(t))
                    .map(|&col| (col, weights.user_tag_weight));

                (
                    movie.id,
                    SparseVector::from_pairs(genres.chain(relevance).chain(user_tags)),
                )
            })
            .collect();

        let index = vectors
            .iter()
            .enumerate()
            .map(|(i, (id, _))| (*id, i))
            .collect();

        info!(
            movies = vectors.len(),
            dimension = space.dimension,
            "Content feature vectors built"
        );

        Self {
            catalog,
            weights,
            vectors,
            index,
            dimension: space.dimension,
        }
    }

    pub fn weights(&self) -> ContentWeights {
        self.weights
    }

    /// Width of the fixed feature space
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn feature_vector(&self, id: MovieId) -> Option<&SparseVector> {
        self.index.get(&id).map(|&i| &self.vectors[i].1)
    }

    /// Symmetric similarity in [0, 1]; unknown movies score 0.0
    pub fn similarity(&self, a: MovieId, b: MovieId) -> f32 {
        match (self.feature_vector(a), self.feature_vector(b)) {
            (Some(va), Some(vb)) => pair_similarity(a, va, b, vb),
            _ => 0.0,
        }
    }

    /// The `limit` movies most similar to `id`, best first, ties by id
    pub fn find_similar(&self, id: MovieId, limit: usize) -> Vec<ScoredMovie> {
        let Some(source) = self.feature_vector(id) else {
            return Vec::new();
        };

        let mut similar: Vec<ScoredMovie> = self
            .vectors
            .par_iter()
            .filter(|(other, _)| *other != id)
            .map(|(other, vector)| ScoredMovie::new(*other, pair_similarity(id, source, *other, vector)))
            .collect();

        crate::ranking::sort_by_score(&mut similar);
        similar.truncate(limit);
        similar
    }

    /// Combined score of every non-seed movie: the sum of its similarity to
    /// each distinct seed, in catalog order
    pub fn score_candidates(&self, profile: &FavoritesProfile) -> Vec<ScoredMovie> {
        let seeds: Vec<(MovieId, &SparseVector)> = profile
            .seeds()
            .iter()
            .filter_map(|&id| self.feature_vector(id).map(|v| (id, v)))
            .collect();

        let scored: Vec<ScoredMovie> = self
            .vectors
            .par_iter()
            .filter(|(id, _)| !profile.contains(*id))
            .map(|(id, vector)| {
                let score = seeds
                    .iter()
                    .map(|(seed, seed_vector)| pair_similarity(*seed, seed_vector, *id, vector))
                    .sum();
                ScoredMovie::new(*id, score)
            })
            .collect();

        debug!(
            seeds = seeds.len(),
            candidates = scored.len(),
            catalog = self.catalog.len(),
            "Content candidates scored"
        );

        scored
    }
}

fn pair_similarity(a: MovieId, va: &SparseVector, b: MovieId, vb: &SparseVector) -> f32 {
    if a == b {
        return 1.0;
    }
    va.cosine(vb).clamp(0.0, 1.0)
}
