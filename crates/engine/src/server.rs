//! HTTP surface of the recommender service

use crate::error::RecommendError;
use crate::profile::SEED_COUNT;
use crate::recommendation::Recommender;
use crate::types::Strategy;
use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

const DEFAULT_TITLE_LIMIT: usize = 50;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    /// List length used when a request omits `top_n`
    pub default_top_n: usize,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Recommend(#[from] RecommendError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Recommend(RecommendError::Resolution { .. }) => "title_not_found",
            ApiError::Recommend(RecommendError::InvalidRequest(_)) | ApiError::BadRequest(_) => {
                "invalid_request"
            }
            ApiError::Recommend(RecommendError::InsufficientCatalog { .. }) => {
                "insufficient_catalog"
            }
            ApiError::Recommend(RecommendError::ModelTraining(_)) => "model_unavailable",
            ApiError::Recommend(RecommendError::UnknownMovie(_)) | ApiError::Internal(_) => {
                "internal_error"
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Recommend(RecommendError::Resolution { .. }) => StatusCode::NOT_FOUND,
            ApiError::Recommend(RecommendError::InvalidRequest(_)) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Recommend(RecommendError::InsufficientCatalog { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Recommend(RecommendError::ModelTraining(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Recommend(RecommendError::UnknownMovie(_)) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.code().to_string(),
            message: self.to_string(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub seed_titles: Vec<String>,
    #[serde(default)]
    pub top_n: Option<usize>,
    pub strategy: Strategy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub strategy: Strategy,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TitleResponse {
    pub titles: Vec<String>,
}

#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "cinerec-service",
        "version": env!("CARGO_PKG_VERSION"),
        "collaborative_ready": state.recommender.collaborative_ready(),
    }))
}

#[get("/api/v1/titles")]
pub async fn list_titles(
    state: web::Data<AppState>,
    query: web::Query<TitleQuery>,
) -> HttpResponse {
    let limit = query.limit.unwrap_or(DEFAULT_TITLE_LIMIT);
    let needle = query.query.as_deref().unwrap_or("");
    let titles = state
        .recommender
        .search_titles(needle, limit)
        .into_iter()
        .map(str::to_string)
        .collect();

    HttpResponse::Ok().json(TitleResponse { titles })
}

#[post("/api/v1/recommendations")]
pub async fn recommend(
    state: web::Data<AppState>,
    body: web::Json<RecommendationRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let seeds: [String; SEED_COUNT] = request.seed_titles.try_into().map_err(|titles: Vec<String>| {
        ApiError::BadRequest(format!(
            "expected {} seed titles, got {}",
            SEED_COUNT,
            titles.len()
        ))
    })?;
    let top_n = request.top_n.unwrap_or(state.default_top_n);
    let strategy = request.strategy;

    debug!(%strategy, top_n, "Recommendation request received");

    let recommender = Arc::clone(&state.recommender);
    let recommendations = web::block(move || recommender.recommend(&seeds, top_n, strategy))
        .await
        .map_err(|e| {
            error!(error = %e, "Recommendation task failed");
            ApiError::Internal(e.to_string())
        })??;

    Ok(HttpResponse::Ok().json(RecommendationResponse {
        strategy,
        recommendations,
    }))
}

/// Register routes and the JSON error format on an app or scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .service(health)
    .service(list_titles)
    .service(recommend);
}
