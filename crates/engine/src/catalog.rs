//! Catalog Store
//!
//! Read-only index of every known movie: identity, genres, user tags and genome
//! tag relevance. Built once from typed records; all validation happens in
//! [`CatalogStore::from_records`].

use crate::error::{DataError, NotFoundError};
use crate::types::{
    GenomeScoreRecord, GenomeTagRecord, Movie, MovieFeatures, MovieId, MovieRecord, TagRecord,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{info, warn};

/// MovieLens marker for a movie without genres
const NO_GENRES: &str = "(no genres listed)";

/// Raw tables the catalog is built from
#[derive(Debug, Clone, Default)]
pub struct CatalogRecords {
    pub movies: Vec<MovieRecord>,
    pub tags: Vec<TagRecord>,
    pub genome_tags: Vec<GenomeTagRecord>,
    pub genome_scores: Vec<GenomeScoreRecord>,
}

/// Immutable movie catalog with O(1) title and id lookups
#[derive(Debug, Clone)]
pub struct CatalogStore {
    /// Movies in insertion order
    movies: Vec<Movie>,
    by_id: HashMap<MovieId, usize>,
    by_title: HashMap<String, MovieId>,
    genre_universe: Vec<String>,
    genome_tag_universe: Vec<String>,
    user_tag_universe: Vec<String>,
}

impl CatalogStore {
    /// Parse and index the catalog tables
    ///
    /// # Errors
    ///
    /// Rejects duplicate ids, empty titles, tag and relevance rows for unknown
    /// movies or unknown genome tags, and relevance outside [0, 1]. A repeated
    /// title is logged and resolves to the movie listed first; the later movie
    /// stays reachable by id.
    pub fn from_records(records: CatalogRecords) -> Result<Self, DataError> {
        let mut movies = Vec::with_capacity(records.movies.len());
        let mut by_id = HashMap::with_capacity(records.movies.len());
        let mut by_title: HashMap<String, MovieId> = HashMap::with_capacity(records.movies.len());

        for record in records.movies {
            let id = MovieId(record.movie_id);
            let title = record.title.trim().to_string();
            if title.is_empty() {
                return Err(DataError::EmptyTitle(id));
            }
            if by_id.contains_key(&id) {
                return Err(DataError::DuplicateMovieId(id));
            }
            match by_title.get(&title).copied() {
                Some(first) => warn!(
                    %title,
                    first = %first,
                    second = %id,
                    "Duplicate title, resolving it to the first movie"
                ),
                None => {
                    by_title.insert(title.clone(), id);
                }
            }

            by_id.insert(id, movies.len());
            movies.push(Movie {
                id,
                title,
                genres: parse_genres(&record.genres),
                tags: BTreeSet::new(),
                tag_relevance: BTreeMap::new(),
            });
        }

        for tag in records.tags {
            let id = MovieId(tag.movie_id);
            let index = *by_id.get(&id).ok_or(DataError::UnknownMovie {
                table: "tags",
                movie_id: id,
            })?;
            let label = normalize_tag(&tag.tag);
            if !label.is_empty() {
                movies[index].tags.insert(label);
            }
        }

        let mut genome_names: HashMap<u32, String> =
            HashMap::with_capacity(records.genome_tags.len());
        for genome_tag in records.genome_tags {
            if genome_names
                .insert(genome_tag.tag_id, genome_tag.tag.trim().to_string())
                .is_some()
            {
                return Err(DataError::DuplicateGenomeTag(genome_tag.tag_id));
            }
        }

        for score in records.genome_scores {
            let id = MovieId(score.movie_id);
            let index = *by_id.get(&id).ok_or(DataError::UnknownMovie {
                table: "genome_scores",
                movie_id: id,
            })?;
            let name = genome_names
                .get(&score.tag_id)
                .ok_or(DataError::UnknownGenomeTag(score.tag_id))?;
            if !score.relevance.is_finite() || !(0.0..=1.0).contains(&score.relevance) {
                return Err(DataError::RelevanceOutOfRange {
                    movie_id: id,
                    relevance: score.relevance,
                });
            }
            movies[index]
                .tag_relevance
                .insert(name.clone(), score.relevance);
        }

        let genre_universe = collect_universe(movies.iter().flat_map(|m| m.genres.iter()));
        let genome_tag_universe =
            collect_universe(movies.iter().flat_map(|m| m.tag_relevance.keys()));
        let user_tag_universe = collect_universe(movies.iter().flat_map(|m| m.tags.iter()));

        info!(
            movies = movies.len(),
            genres = genre_universe.len(),
            genome_tags = genome_tag_universe.len(),
            user_tags = user_tag_universe.len(),
            "Catalog store built"
        );

        Ok(Self {
            movies,
            by_id,
            by_title,
            genre_universe,
            genome_tag_universe,
            user_tag_universe,
        })
    }

    /// Resolve a display title to its movie id (exact match after trimming)
    pub fn resolve(&self, title: &str) -> Result<MovieId, NotFoundError> {
        self.by_title
            .get(title.trim())
            .copied()
            .ok_or_else(|| NotFoundError {
                title: title.to_string(),
            })
    }

    /// Attributes used by the content engine
    pub fn features(&self, id: MovieId) -> Result<MovieFeatures<'_>, DataError> {
        let movie = self.movie(id).ok_or(DataError::UnknownMovie {
            table: "catalog",
            movie_id: id,
        })?;
        Ok(MovieFeatures {
            genres: &movie.genres,
            tags: &movie.tags,
            tag_relevance: &movie.tag_relevance,
        })
    }

    pub fn movie(&self, id: MovieId) -> Option<&Movie> {
        self.by_id.get(&id).map(|&index| &self.movies[index])
    }

    pub fn title(&self, id: MovieId) -> Option<&str> {
        self.movie(id).map(|m| m.title.as_str())
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Movies in catalog insertion order
    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.movies.iter()
    }

    /// All titles in catalog insertion order
    pub fn titles(&self) -> Vec<&str> {
        self.movies.iter().map(|m| m.title.as_str()).collect()
    }

    /// Titles containing `query` (case-insensitive), in catalog order
    pub fn search_titles(&self, query: &str, limit: usize) -> Vec<&str> {
        let needle = query.trim().to_lowercase();
        self.movies
            .iter()
            .filter(|m| needle.is_empty() || m.title.to_lowercase().contains(&needle))
            .take(limit)
            .map(|m| m.title.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Sorted union of all genre labels
    pub fn genre_universe(&self) -> &[String] {
        &self.genre_universe
    }

    /// Sorted union of genome tags with at least one relevance score
    pub fn genome_tag_universe(&self) -> &[String] {
        &self.genome_tag_universe
    }

    /// Sorted union of normalized user tags
    pub fn user_tag_universe(&self) -> &[String] {
        &self.user_tag_universe
    }
}

fn parse_genres(raw: &str) -> BTreeSet<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|g| !g.is_empty() && *g != NO_GENRES)
        .map(str::to_string)
        .collect()
}

fn normalize_tag(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn collect_universe<'a>(labels: impl Iterator<Item = &'a String>) -> Vec<String> {
    labels
        .cloned()
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u32, title: &str, genres: &str) -> MovieRecord {
        MovieRecord {
            movie_id: id,
            title: title.to_string(),
            genres: genres.to_string(),
        }
    }

    fn sample_records() -> CatalogRecords {
        CatalogRecords {
            movies: vec![
                movie(1, "Toy Story (1995)", "Adventure|Animation|Children"),
                movie(2, "Heat (1995)", "Action|Crime|Thriller"),
                movie(3, "Empty (2000)", "(no genres listed)"),
            ],
            tags: vec![
                TagRecord {
                    user_id: 7,
                    movie_id: 1,
                    tag: "  Pixar ".to_string(),
                    timestamp: 1_139_045_764,
                },
                TagRecord {
                    user_id: 8,
                    movie_id: 1,
                    tag: "pixar".to_string(),
                    timestamp: 1_139_045_765,
                },
                TagRecord {
                    user_id: 8,
                    movie_id: 2,
                    tag: String::new(),
                    timestamp: 1_139_045_766,
                },
            ],
            genome_tags: vec![
                GenomeTagRecord {
                    tag_id: 1,
                    tag: "toys".to_string(),
                },
                GenomeTagRecord {
                    tag_id: 2,
                    tag: "heist".to_string(),
                },
            ],
            genome_scores: vec![
                GenomeScoreRecord {
                    movie_id: 1,
                    tag_id: 1,
                    relevance: 0.95,
                },
                GenomeScoreRecord {
                    movie_id: 2,
                    tag_id: 2,
                    relevance: 0.8,
                },
            ],
        }
    }

    #[test]
    fn test_resolve_and_features() {
        let catalog = CatalogStore::from_records(sample_records()).unwrap();
        assert_eq!(catalog.len(), 3);

        let id = catalog.resolve("Toy Story (1995)").unwrap();
        assert_eq!(id, MovieId(1));

        let features = catalog.features(id).unwrap();
        assert!(features.genres.contains("Animation"));
        assert_eq!(features.tags.len(), 1);
        assert!(features.tags.contains("pixar"));
        assert_eq!(features.tag_relevance.get("toys"), Some(&0.95));
    }

    #[test]
    fn test_resolve_unknown_title() {
        let catalog = CatalogStore::from_records(sample_records()).unwrap();
        let err = catalog.resolve("Nonexistent Movie 9999").unwrap_err();
        assert_eq!(err.title, "Nonexistent Movie 9999");
    }

    #[test]
    fn test_no_genres_marker_is_empty_set() {
        let catalog = CatalogStore::from_records(sample_records()).unwrap();
        let features = catalog.features(MovieId(3)).unwrap();
        assert!(features.genres.is_empty());
        assert!(!catalog.genre_universe().contains(&NO_GENRES.to_string()));
    }

    #[test]
    fn test_universes_are_sorted() {
        let catalog = CatalogStore::from_records(sample_records()).unwrap();
        assert_eq!(
            catalog.genre_universe(),
            &["Action", "Adventure", "Animation", "Children", "Crime", "Thriller"]
        );
        assert_eq!(catalog.genome_tag_universe(), &["heist", "toys"]);
        assert_eq!(catalog.user_tag_universe(), &["pixar"]);
    }

    #[test]
    fn test_titles_in_insertion_order() {
        let catalog = CatalogStore::from_records(sample_records()).unwrap();
        assert_eq!(
            catalog.titles(),
            vec!["Toy Story (1995)", "Heat (1995)", "Empty (2000)"]
        );
        assert_eq!(catalog.search_titles("1995", 10).len(), 2);
        assert_eq!(catalog.search_titles("HEAT", 10), vec!["Heat (1995)"]);
        assert_eq!(catalog.search_titles("", 1), vec!["Toy Story (1995)"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut records = sample_records();
        records.movies.push(movie(1, "Other (2001)", "Drama"));
        assert!(matches!(
            CatalogStore::from_records(records),
            Err(DataError::DuplicateMovieId(MovieId(1)))
        ));
    }

    #[test]
    fn test_duplicate_title_resolves_to_first_movie() {
        let mut records = sample_records();
        records.movies.push(movie(9, "Heat (1995)", "Drama"));
        let catalog = CatalogStore::from_records(records).unwrap();

        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.resolve("Heat (1995)").unwrap(), MovieId(2));
        assert!(catalog.contains(MovieId(9)));
        assert_eq!(catalog.title(MovieId(9)), Some("Heat (1995)"));
        assert!(catalog.features(MovieId(9)).unwrap().genres.contains("Drama"));
    }

    #[test]
    fn test_tag_for_unknown_movie_rejected() {
        let mut records = sample_records();
        records.tags[0].movie_id = 404;
        assert!(matches!(
            CatalogStore::from_records(records),
            Err(DataError::UnknownMovie {
                table: "tags",
                movie_id: MovieId(404)
            })
        ));
    }

    #[test]
    fn test_relevance_out_of_range_rejected() {
        let mut records = sample_records();
        records.genome_scores[0].relevance = 1.5;
        assert!(matches!(
            CatalogStore::from_records(records),
            Err(DataError::RelevanceOutOfRange { .. })
        ));
    }

    #[test]
    fn test_unknown_genome_tag_rejected() {
        let mut records = sample_records();
        records.genome_scores[0].tag_id = 99;
        assert!(matches!(
            CatalogStore::from_records(records),
            Err(DataError::UnknownGenomeTag(99))
        ));
    }
}
