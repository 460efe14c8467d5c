//! Rating Store
//!
//! Sparse user x movie ratings, validated against the catalog and the rating
//! scale, read-only after construction.

use crate::catalog::CatalogStore;
use crate::error::DataError;
use crate::types::{MovieId, Rating, RatingRecord, UserId};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Inclusive bounds of the rating scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingScale {
    pub min_score: f32,
    pub max_score: f32,
}

impl Default for RatingScale {
    fn default() -> Self {
        Self {
            min_score: 0.5,
            max_score: 5.0,
        }
    }
}

impl RatingScale {
    pub fn contains(&self, score: f32) -> bool {
        score.is_finite() && score >= self.min_score && score <= self.max_score
    }

    pub fn is_valid(&self) -> bool {
        self.min_score.is_finite()
            && self.max_score.is_finite()
            && self.max_score > 0.0
            && self.min_score < self.max_score
    }

    /// Map a score onto (0, 1] relative to the scale maximum
    pub fn preference(&self, score: f32) -> f32 {
        score / self.max_score
    }
}

/// Immutable set of validated ratings
#[derive(Debug, Clone)]
pub struct RatingStore {
    /// Ratings in source order
    ratings: Vec<Rating>,
    scale: RatingScale,
    by_movie: HashMap<MovieId, Vec<usize>>,
    user_count: usize,
}

impl RatingStore {
    /// Validate and index rating rows
    ///
    /// # Errors
    ///
    /// Rejects an invalid scale, ratings for movies missing from the catalog,
    /// scores outside the scale and unrepresentable timestamps. Repeated
    /// (user, movie) pairs are kept as-is.
    pub fn from_records(
        records: Vec<RatingRecord>,
        catalog: &CatalogStore,
        scale: RatingScale,
    ) -> Result<Self, DataError> {
        if !scale.is_valid() {
            return Err(DataError::InvalidScale {
                min: scale.min_score,
                max: scale.max_score,
            });
        }

        let mut ratings = Vec::with_capacity(records.len());
        let mut by_movie: HashMap<MovieId, Vec<usize>> = HashMap::new();
        let mut users: HashSet<UserId> = HashSet::new();

        for record in records {
            let movie_id = MovieId(record.movie_id);
            if !catalog.contains(movie_id) {
                return Err(DataError::UnknownMovie {
                    table: "ratings",
                    movie_id,
                });
            }
            if !scale.contains(record.rating) {
                return Err(DataError::RatingOutOfRange {
                    movie_id,
                    score: record.rating,
                    min: scale.min_score,
                    max: scale.max_score,
                });
            }
            let timestamp = DateTime::from_timestamp(record.timestamp, 0)
                .ok_or(DataError::InvalidTimestamp(record.timestamp))?;

            let user_id = UserId(record.user_id);
            users.insert(user_id);
            by_movie.entry(movie_id).or_default().push(ratings.len());
            ratings.push(Rating {
                user_id,
                movie_id,
                score: record.rating,
                timestamp,
            });
        }

        info!(
            ratings = ratings.len(),
            users = users.len(),
            rated_movies = by_movie.len(),
            "Rating store built"
        );

        Ok(Self {
            ratings,
            scale,
            by_movie,
            user_count: users.len(),
        })
    }

    pub fn scale(&self) -> RatingScale {
        self.scale
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn user_count(&self) -> usize {
        self.user_count
    }

    /// All ratings in source order
    pub fn iter(&self) -> impl Iterator<Item = &Rating> {
        self.ratings.iter()
    }

    pub fn ratings_for(&self, movie_id: MovieId) -> impl Iterator<Item = &Rating> {
        self.by_movie
            .get(&movie_id)
            .into_iter()
            .flatten()
            .map(|&index| &self.ratings[index])
    }

    pub fn rating_count(&self, movie_id: MovieId) -> usize {
        self.by_movie.get(&movie_id).map_or(0, Vec::len)
    }

    pub fn mean_rating(&self, movie_id: MovieId) -> Option<f32> {
        let count = self.rating_count(movie_id);
        if count == 0 {
            return None;
        }
        let total: f32 = self.ratings_for(movie_id).map(|r| r.score).sum();
        Some(total / count as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogRecords;
    use crate::types::MovieRecord;

    fn catalog() -> CatalogStore {
        CatalogStore::from_records(CatalogRecords {
            movies: vec![
                MovieRecord {
                    movie_id: 1,
                    title: "Heat (1995)".to_string(),
                    genres: "Action|Crime".to_string(),
                },
                MovieRecord {
                    movie_id: 2,
                    title: "Casino (1995)".to_string(),
                    genres: "Crime|Drama".to_string(),
                },
            ],
            ..CatalogRecords::default()
        })
        .unwrap()
    }

    fn rating(user_id: u32, movie_id: u32, rating: f32) -> RatingRecord {
        RatingRecord {
            user_id,
            movie_id,
            rating,
            timestamp: 1_436_165_433,
        }
    }

    #[test]
    fn test_store_indexes_by_movie() {
        let store = RatingStore::from_records(
            vec![rating(1, 1, 4.0), rating(2, 1, 5.0), rating(2, 2, 3.0)],
            &catalog(),
            RatingScale::default(),
        )
        .unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.user_count(), 2);
        assert_eq!(store.rating_count(MovieId(1)), 2);
        assert_eq!(store.mean_rating(MovieId(1)), Some(4.5));
        assert_eq!(store.mean_rating(MovieId(99)), None);
        assert_eq!(store.ratings_for(MovieId(2)).count(), 1);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let store = RatingStore::from_records(
            vec![rating(1, 1, 4.0), rating(1, 1, 2.0)],
            &catalog(),
            RatingScale::default(),
        )
        .unwrap();
        assert_eq!(store.rating_count(MovieId(1)), 2);
    }

    #[test]
    fn test_unknown_movie_rejected() {
        let result =
            RatingStore::from_records(vec![rating(1, 3, 4.0)], &catalog(), RatingScale::default());
        assert!(matches!(
            result,
            Err(DataError::UnknownMovie {
                table: "ratings",
                movie_id: MovieId(3)
            })
        ));
    }

    #[test]
    fn test_out_of_scale_rejected() {
        for bad in [0.0, 5.5, f32::NAN] {
            let result = RatingStore::from_records(
                vec![rating(1, 1, bad)],
                &catalog(),
                RatingScale::default(),
            );
            assert!(matches!(result, Err(DataError::RatingOutOfRange { .. })));
        }
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let scale = RatingScale {
            min_score: 5.0,
            max_score: 1.0,
        };
        assert!(matches!(
            RatingStore::from_records(vec![], &catalog(), scale),
            Err(DataError::InvalidScale { .. })
        ));
    }

    #[test]
    fn test_preference_scaling() {
        let scale = RatingScale::default();
        assert_eq!(scale.preference(5.0), 1.0);
        assert_eq!(scale.preference(2.5), 0.5);
    }
}
