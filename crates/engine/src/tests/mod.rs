//! Shared fixture: six movies, four users who rated all of them
//!
//! Users 1 and 2 favour the action titles, users 3 and 4 the romances.

use crate::catalog::{CatalogRecords, CatalogStore};
use crate::ratings::{RatingScale, RatingStore};
use crate::types::{MovieRecord, RatingRecord, TagRecord};


pub(crate) const MOVIES: [(u32, &str, &str); 6] = [
    (1, "Predator (1987)", "Action|Sci-Fi|Thriller"),
    (2, "The Terminator (1984)", "Action|Sci-Fi|Thriller"),
    (3, "Notting Hill (1999)", "Comedy|Romance"),
    (4, "Aliens (1986)", "Action|Horror|Sci-Fi|Thriller"),
    (5, "RoboCop (1987)", "Action|Crime|Sci-Fi"),
    (6, "Pride and Prejudice (2005)", "Drama|Romance"),
];

/// (user, movie, score)
pub(crate) const RATINGS: [(u32, u32, f32); 24] = [
    (1, 1, 5.0),
    (1, 2, 5.0),
    (1, 3, 1.0),
    (1, 4, 4.5),
    (1, 5, 4.0),
    (1, 6, 1.0),
    (2, 1, 4.5),
    (2, 2, 5.0),
    (2, 3, 1.5),
    (2, 4, 5.0),
    (2, 5, 4.5),
    (2, 6, 1.0),
    (3, 1, 1.0),
    (3, 2, 1.5),
    (3, 3, 5.0),
    (3, 4, 1.0),
    (3, 5, 1.0),
    (3, 6, 5.0),
    (4, 1, 1.5),
    (4, 2, 1.0),
    (4, 3, 4.5),
    (4, 4, 1.5),
    (4, 5, 2.0),
    (4, 6, 4.5),
];

pub(crate) fn fixture_records() -> CatalogRecords {
    let movies = MOVIES
        .iter()
        .map(|&(movie_id, title, genres)| MovieRecord {
            movie_id,
            title: title.to_string(),
            genres: genres.to_string(),
        })
        .collect();

    let tag = |user_id: u32, movie_id: u32, tag: &str| TagRecord {
        user_id,
        movie_id,
        tag: tag.to_string(),
        timestamp: 1_139_045_764,
    };

    CatalogRecords {
        movies,
        tags: vec![
            tag(1, 1, "Arnold"),
            tag(2, 2, "arnold"),
            tag(3, 3, "Hugh Grant"),
            tag(1, 4, "Sigourney Weaver"),
        ],
        ..CatalogRecords::default()
    }
}

pub(crate) fn fixture_catalog() -> CatalogStore {
    CatalogStore::from_records(fixture_records()).unwrap()
}

pub(crate) fn rating_records() -> Vec<RatingRecord> {
    RATINGS
        .iter()
        .map(|&(user_id, movie_id, rating)| RatingRecord {
            user_id,
            movie_id,
            rating,
            timestamp: 1_139_045_764,
        })
        .collect()
}

pub(crate) fn fixture_ratings(catalog: &CatalogStore) -> RatingStore {
    RatingStore::from_records(rating_records(), catalog, RatingScale::default()).unwrap()
}
