//! Ranking & Selection
//!
//! Turns an engine's candidate scores into the final top-N list: score
//! descending, ties broken by movie id ascending, seeds removed.

use crate::catalog::CatalogStore;
use crate::error::{RecommendError, Result};
use crate::types::{MovieId, ScoredMovie};
use std::cmp::Ordering;
use tracing::error;

/// Total order used for every ranked list: score descending, then id ascending.
/// NaN scores rank like negative infinity.
pub fn compare_scored(a: &ScoredMovie, b: &ScoredMovie) -> Ordering {
    sanitize(b.score)
        .total_cmp(&sanitize(a.score))
        .then_with(|| a.movie_id.cmp(&b.movie_id))
}

pub fn sort_by_score(candidates: &mut [ScoredMovie]) {
    candidates.sort_unstable_by(compare_scored);
}

fn sanitize(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

/// Rank candidates and keep the best `top_n`
///
/// Output length is `top_n` unless fewer eligible candidates exist; that is
/// not an error here.
pub struct RankAndSelect;

impl RankAndSelect {
    pub fn execute(
        candidates: Vec<ScoredMovie>,
        seeds: &[MovieId],
        top_n: usize,
    ) -> Vec<ScoredMovie> {
        let mut eligible: Vec<ScoredMovie> = candidates
            .into_iter()
            .filter(|c| !seeds.contains(&c.movie_id))
            .collect();

        if eligible.len() > top_n && top_n > 0 {
            eligible.select_nth_unstable_by(top_n - 1, compare_scored);
            eligible.truncate(top_n);
        }
        sort_by_score(&mut eligible);
        eligible.truncate(top_n);
        eligible
    }

    /// Map ranked ids to display titles
    ///
    /// # Errors
    ///
    /// `UnknownMovie` for the first id the catalog cannot name.
    pub fn titles(ranked: &[ScoredMovie], catalog: &CatalogStore) -> Result<Vec<String>> {
        ranked
            .iter()
            .map(|c| {
                catalog.title(c.movie_id).map(str::to_string).ok_or_else(|| {
                    error!(movie_id = %c.movie_id, "Ranked movie missing from catalog");
                    RecommendError::UnknownMovie(c.movie_id)
                })
            })
            .collect()
    }
}
