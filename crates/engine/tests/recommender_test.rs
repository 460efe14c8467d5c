//! End-to-end behaviour of the public recommender API

use cinerec_engine::{
    CatalogRecords, CatalogStore, DataSet, ModelTrainingError, MovieId, MovieRecord,
    RatingRecord, RatingScale, RatingStore, RecommendError, Recommender, RecommenderConfig,
    Strategy, TagRecord,
};
use std::fs;
use std::sync::Arc;

const MOVIES: [(u32, &str, &str); 8] = [
    (1, "Heat (1995)", "Action|Crime|Thriller"),
    (2, "Ronin (1998)", "Action|Crime|Thriller"),
    (3, "Sense and Sensibility (1995)", "Drama|Romance"),
    (4, "Emma (1996)", "Comedy|Drama|Romance"),
    (5, "Toy Story (1995)", "Adventure|Animation|Children|Comedy|Fantasy"),
    (6, "Casino (1995)", "Crime|Drama"),
    (7, "Jumanji (1995)", "Adventure|Children|Fantasy"),
    (8, "Nixon (1995)", "Drama"),
];

fn catalog_records() -> CatalogRecords {
    CatalogRecords {
        movies: MOVIES
            .iter()
            .map(|&(movie_id, title, genres)| MovieRecord {
                movie_id,
                title: title.to_string(),
                genres: genres.to_string(),
            })
            .collect(),
        tags: vec![
            TagRecord {
                user_id: 7,
                movie_id: 1,
                tag: "heist".to_string(),
                timestamp: 1_445_714_994,
            },
            TagRecord {
                user_id: 7,
                movie_id: 2,
                tag: "Heist".to_string(),
                timestamp: 1_445_714_996,
            },
        ],
        ..CatalogRecords::default()
    }
}

fn rating_records() -> Vec<RatingRecord> {
    let mut records = Vec::new();
    for user_id in 1..=6u32 {
        for &(movie_id, _, genres) in &MOVIES {
            // Odd users like crime, even users like romance and family films
            let likes = if user_id % 2 == 1 {
                genres.contains("Crime")
            } else {
                genres.contains("Romance") || genres.contains("Children")
            };
            // Movie 8 stays unrated
            if movie_id == 8 {
                continue;
            }
            records.push(RatingRecord {
                user_id,
                movie_id,
                rating: if likes { 4.5 } else { 1.5 },
                timestamp: 964_982_703 + movie_id as i64,
            });
        }
    }
    records
}

fn build(records: Vec<RatingRecord>) -> Recommender {
    let catalog = Arc::new(CatalogStore::from_records(catalog_records()).unwrap());
    let ratings =
        Arc::new(RatingStore::from_records(records, &catalog, RatingScale::default()).unwrap());
    Recommender::new(catalog, ratings, &RecommenderConfig::default())
}

const SEEDS: [&str; 3] = ["Heat (1995)", "Ronin (1998)", "Emma (1996)"];

#[test]
fn test_independent_recommenders_agree() {
    let a = build(rating_records());
    let b = build(rating_records());

    for strategy in [Strategy::Content, Strategy::Collaborative] {
        let first = a.recommend(&SEEDS, 5, strategy).unwrap();
        assert_eq!(first, a.recommend(&SEEDS, 5, strategy).unwrap());
        assert_eq!(first, b.recommend(&SEEDS, 5, strategy).unwrap());
    }
}

#[test]
fn test_cardinality() {
    let recommender = build(rating_records());
    for top_n in 1..=5 {
        for strategy in [Strategy::Content, Strategy::Collaborative] {
            let recommendations = recommender.recommend(&SEEDS, top_n, strategy).unwrap();
            assert_eq!(recommendations.len(), top_n);
        }
    }

    assert_eq!(
        recommender.recommend(&SEEDS, 6, Strategy::Collaborative),
        Err(RecommendError::InsufficientCatalog {
            requested: 6,
            available: 5
        })
    );
    assert_eq!(
        recommender
            .recommend(&SEEDS, 6, Strategy::Content)
            .unwrap()
            .len(),
        5
    );
}

#[test]
fn test_unrated_movie_ranks_last_for_collaborative() {
    let recommender = build(rating_records());
    let recommendations = recommender
        .recommend(&SEEDS, 5, Strategy::Collaborative)
        .unwrap();
    assert_eq!(recommendations.last().map(String::as_str), Some("Nixon (1995)"));
}

#[test]
fn test_content_similarity_is_symmetric_and_self_maximal() {
    let recommender = build(rating_records());
    let content = recommender.content_engine();
    for &(a, _, _) in &MOVIES {
        let self_similarity = content.similarity(MovieId(a), MovieId(a));
        assert_eq!(self_similarity, 1.0);
        for &(b, _, _) in &MOVIES {
            let ab = content.similarity(MovieId(a), MovieId(b));
            let ba = content.similarity(MovieId(b), MovieId(a));
            assert_eq!(ab.to_bits(), ba.to_bits());
            assert!(ab <= self_similarity);
        }
    }
}

#[test]
fn test_unknown_seed_is_named() {
    let recommender = build(rating_records());
    for strategy in [Strategy::Content, Strategy::Collaborative] {
        let result = recommender.recommend(
            &["Heat (1995)", "Ronin (1998)", "Nonexistent Movie 9999"],
            3,
            strategy,
        );
        assert_eq!(
            result,
            Err(RecommendError::Resolution {
                title: "Nonexistent Movie 9999".to_string()
            })
        );
    }
}

#[test]
fn test_concurrent_first_requests_train_once() {
    let recommender = build(rating_records());
    let results: Vec<Vec<String>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..6)
            .map(|_| scope.spawn(|| recommender.recommend(&SEEDS, 4, Strategy::Collaborative)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect()
    });

    assert!(recommender.collaborative_ready());
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn test_failed_training_is_isolated() {
    let recommender = build(Vec::new());
    assert_eq!(recommender.warm_up(), Err(ModelTrainingError::EmptyRatings));
    assert!(!recommender.collaborative_ready());

    for _ in 0..2 {
        assert_eq!(
            recommender.recommend(&SEEDS, 3, Strategy::Collaborative),
            Err(RecommendError::ModelTraining(ModelTrainingError::EmptyRatings))
        );
    }
    assert_eq!(
        recommender
            .recommend(&SEEDS, 3, Strategy::Content)
            .unwrap()
            .len(),
        3
    );
}

#[test]
fn test_loaded_data_set_serves_recommendations() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("movies.csv"),
        "movieId,title,genres\n\
         1,Heat (1995),Action|Crime|Thriller\n\
         2,Ronin (1998),Action|Crime|Thriller\n\
         3,Emma (1996),Comedy|Drama|Romance\n\
         4,Casino (1995),Crime|Drama\n\
         5,Jumanji (1995),Adventure|Children|Fantasy\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("train.csv"),
        "userId,movieId,rating,timestamp\n\
         1,1,5.0,964982703\n\
         1,4,4.0,964982704\n\
         2,3,4.5,964982705\n\
         2,5,3.5,964982706\n",
    )
    .unwrap();

    let mut config = RecommenderConfig::default();
    config.data.dir = dir.path().to_path_buf();

    let (catalog, ratings) = DataSet::load(&config.data)
        .unwrap()
        .into_stores(config.ratings)
        .unwrap();
    let recommender = Recommender::new(Arc::new(catalog), Arc::new(ratings), &config);

    let recommendations = recommender
        .recommend(&SEEDS, 2, Strategy::Content)
        .unwrap();
    assert_eq!(recommendations[0], "Casino (1995)");
    assert!(recommender.warm_up().is_ok());
}
