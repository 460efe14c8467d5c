//! Core domain types and the typed records accepted at the load boundary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Stable catalog identifier of a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u32);

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a user who contributed ratings or tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog movie with its descriptive metadata
///
/// Sets and maps are ordered so feature construction iterates them
/// deterministically.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub genres: BTreeSet<String>,
    /// Free-text labels contributed by users (trimmed, lowercased)
    pub tags: BTreeSet<String>,
    /// Genome tag name -> relevance in [0, 1]
    pub tag_relevance: BTreeMap<String, f32>,
}

/// Borrowed view of the attributes used for content similarity
#[derive(Debug, Clone, Copy)]
pub struct MovieFeatures<'a> {
    pub genres: &'a BTreeSet<String>,
    pub tags: &'a BTreeSet<String>,
    pub tag_relevance: &'a BTreeMap<String, f32>,
}

/// One validated rating
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub score: f32,
    pub timestamp: DateTime<Utc>,
}

/// Recommendation strategy selected by the caller
///
/// Deserialized through [`FromStr`], so every accepted spelling is
/// case-insensitive on the wire as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Strategy {
    Content,
    Collaborative,
}

impl TryFrom<String> for Strategy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "content" | "content_based" | "content based filtering" => Ok(Strategy::Content),
            "collaborative" | "collaborative_based" | "collaborative based filtering" => {
                Ok(Strategy::Collaborative)
            }
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Content => write!(f, "content"),
            Strategy::Collaborative => write!(f, "collaborative"),
        }
    }
}

/// A candidate movie with the score an engine assigned to it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredMovie {
    pub movie_id: MovieId,
    pub score: f32,
}

impl ScoredMovie {
    pub fn new(movie_id: MovieId, score: f32) -> Self {
        Self { movie_id, score }
    }
}

/// Row of `movies.csv`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieRecord {
    #[serde(rename = "movieId")]
    pub movie_id: u32,
    pub title: String,
    /// `|`-separated genre labels
    pub genres: String,
}

/// Row of `tags.csv`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TagRecord {
    #[serde(rename = "userId")]
    pub user_id: u32,
    #[serde(rename = "movieId")]
    pub movie_id: u32,
    #[serde(default)]
    pub tag: String,
    pub timestamp: i64,
}

/// Row of `genome_tags.csv`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenomeTagRecord {
    #[serde(rename = "tagId")]
    pub tag_id: u32,
    pub tag: String,
}

/// Row of `genome_scores.csv`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenomeScoreRecord {
    #[serde(rename = "movieId")]
    pub movie_id: u32,
    #[serde(rename = "tagId")]
    pub tag_id: u32,
    pub relevance: f32,
}

/// Row of the ratings table (`train.csv`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatingRecord {
    #[serde(rename = "userId")]
    pub user_id: u32,
    #[serde(rename = "movieId")]
    pub movie_id: u32,
    pub rating: f32,
    pub timestamp: i64,
}
