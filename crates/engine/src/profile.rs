//! Favorites profile
//!
//! The three seed titles of a request, resolved to catalog ids.

use crate::catalog::CatalogStore;
use crate::error::RecommendError;
use crate::types::MovieId;

/// Number of seed titles a request carries
pub const SEED_COUNT: usize = 3;

/// Resolved seeds of one request
///
/// Repeated titles collapse to one seed; order of first occurrence is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoritesProfile {
    seeds: Vec<MovieId>,
}

impl FavoritesProfile {
    /// Resolve every title, failing on the first one the catalog lacks
    pub fn from_titles<S: AsRef<str>>(
        catalog: &CatalogStore,
        titles: &[S; SEED_COUNT],
    ) -> Result<Self, RecommendError> {
        let mut seeds = Vec::with_capacity(SEED_COUNT);
        for title in titles {
            let id = catalog.resolve(title.as_ref())?;
            if !seeds.contains(&id) {
                seeds.push(id);
            }
        }
        Ok(Self { seeds })
    }

    pub fn from_ids(ids: impl IntoIterator<Item = MovieId>) -> Self {
        let mut seeds = Vec::new();
        for id in ids {
            if !seeds.contains(&id) {
                seeds.push(id);
            }
        }
        Self { seeds }
    }

    /// Distinct seeds in request order
    pub fn seeds(&self) -> &[MovieId] {
        &self.seeds
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.seeds.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }
}
