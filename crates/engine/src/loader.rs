//! CSV loading for the MovieLens-style data directory

use crate::catalog::{CatalogRecords, CatalogStore};
use crate::config::DataConfig;
use crate::error::DataError;
use crate::ratings::{RatingScale, RatingStore};
use crate::types::{GenomeScoreRecord, GenomeTagRecord, MovieRecord, RatingRecord, TagRecord};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{info, warn};

/// All tables of one data directory, parsed but not yet validated
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    pub movies: Vec<MovieRecord>,
    pub tags: Vec<TagRecord>,
    pub genome_tags: Vec<GenomeTagRecord>,
    pub genome_scores: Vec<GenomeScoreRecord>,
    pub ratings: Vec<RatingRecord>,
}

impl DataSet {
    /// Read every table named in `config`
    ///
    /// The movies and ratings files are required. Tag and genome files that do
    /// not exist are logged and treated as empty.
    ///
    /// # Errors
    ///
    /// Fails on the first missing required file or malformed row, naming the file.
    pub fn load(config: &DataConfig) -> Result<Self, DataError> {
        let dir = config.dir.as_path();
        info!(dir = %dir.display(), "Loading data set");

        let data = Self {
            movies: read_table(dir, &config.movies_file)?,
            tags: read_optional_table(dir, &config.tags_file)?,
            genome_tags: read_optional_table(dir, &config.genome_tags_file)?,
            genome_scores: read_optional_table(dir, &config.genome_scores_file)?,
            ratings: read_table(dir, &config.ratings_file)?,
        };

        info!(
            movies = data.movies.len(),
            tags = data.tags.len(),
            genome_tags = data.genome_tags.len(),
            genome_scores = data.genome_scores.len(),
            ratings = data.ratings.len(),
            "Data set loaded"
        );

        Ok(data)
    }

    /// Validate the tables and build the catalog, then the rating store
    pub fn into_stores(self, scale: RatingScale) -> Result<(CatalogStore, RatingStore), DataError> {
        let catalog = CatalogStore::from_records(CatalogRecords {
            movies: self.movies,
            tags: self.tags,
            genome_tags: self.genome_tags,
            genome_scores: self.genome_scores,
        })?;
        let ratings = RatingStore::from_records(self.ratings, &catalog, scale)?;
        Ok((catalog, ratings))
    }
}

fn read_table<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>, DataError> {
    let path = dir.join(file);
    let csv_error = |source: csv::Error| DataError::Csv {
        file: path.display().to_string(),
        source,
    };

    let mut reader = csv::Reader::from_path(&path).map_err(csv_error)?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(csv_error)
}

fn read_optional_table<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>, DataError> {
    let path = dir.join(file);
    if !path.exists() {
        warn!(file = %path.display(), "Optional data file missing, continuing without it");
        return Ok(Vec::new());
    }
    read_table(dir, file)
}
