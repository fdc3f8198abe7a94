use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::TokenConfig;
use crate::config::AppConfig;
use crate::progress::{ProgressError, ProgressRepository, ProgressService};
use crate::stats::StatsService;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub progress_repository: Arc<dyn ProgressRepository>,
    pub token_config: TokenConfig,
    pub max_experience_per_session: i64,
}

impl AppState {
    pub fn new(progress_repository: Arc<dyn ProgressRepository>, config: &AppConfig) -> Self {
        Self {
            progress_repository,
            token_config: TokenConfig::from_config(config),
            max_experience_per_session: config.max_experience_per_session,
        }
    }

    pub fn progress_service(&self) -> ProgressService {
        ProgressService::new(
            Arc::clone(&self.progress_repository),
            self.max_experience_per_session,
        )
    }

    pub fn stats_service(&self) -> StatsService {
        StatsService::new(Arc::clone(&self.progress_repository))
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<ProgressError> for AppError {
    fn from(error: ProgressError) -> Self {
        match error {
            ProgressError::Validation(msg) => AppError::Validation(msg),
            ProgressError::Reference(msg) => AppError::NotFound(msg),
            ProgressError::Storage(msg) => AppError::DatabaseError(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::JwtError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
