//! Health check handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
pub struct Readiness {
    mongo: &'static str,
    elastic: &'static str,
}

/// Readiness health check endpoint.
///
/// Pings MongoDB and Elasticsearch. Returns 503 Service Unavailable if
/// either is unreachable.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let container = state.container();

    let mongo = container.mongo().ping().await.map_err(|e| e.to_string());
    let elastic = container.elastic().ping().await.map_err(|e| e.to_string());

    let status = |result: &Result<(), String>, store: &str| match result {
        Ok(()) => "ok",
        Err(error) => {
            tracing::warn!(store, %error, "Readiness check failed");
            "unavailable"
        }
    };

    let body = Readiness {
        mongo: status(&mongo, "mongo"),
        elastic: status(&elastic, "elastic"),
    };

    let code = if mongo.is_ok() && elastic.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(body))
}
