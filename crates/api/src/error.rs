//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::container::ContainerError;
use crate::db::RepositoryError;
use crate::lamoda::LamodaError;
use crate::services::ServiceError;
use crate::twitch::TwitchError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Lamoda or Twitch failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An upstream rate limit was hit; retry after the given seconds.
    #[error("Rate limited")]
    RateLimited(u64),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Repository(e) => Self::Database(e),
            ServiceError::NotFound(what) => Self::NotFound(what),
            ServiceError::InvalidInput(e) => Self::BadRequest(e.to_string()),
            ServiceError::Lamoda(LamodaError::CategoryNotFound(category)) => {
                Self::NotFound(format!("lamoda category {category}"))
            }
            ServiceError::Lamoda(LamodaError::RateLimited(secs))
            | ServiceError::Twitch(TwitchError::RateLimited(secs)) => Self::RateLimited(secs),
            ServiceError::Lamoda(e) => Self::Upstream(e.to_string()),
            ServiceError::Twitch(e) => Self::Upstream(e.to_string()),
        }
    }
}

impl From<ContainerError> for AppError {
    fn from(err: ContainerError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Upstream(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Upstream(_) => "External service error".to_string(),
            _ => self.to_string(),
        };

        let body = Json(json!({ "error": message }));

        match self {
            Self::RateLimited(secs) => {
                (status, [(header::RETRY_AFTER, secs.to_string())], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
