//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                             - Liveness check
//! GET    /health/ready                       - MongoDB + Elasticsearch ping
//!
//! # api.v1.lamoda.products
//! POST   /api/v1/lamoda/products/{category}  - Scrape category (write)
//! GET    /api/v1/lamoda/products             - List products (read)
//! GET    /api/v1/lamoda/products/{category}  - List category (read)
//! DELETE /api/v1/lamoda/products             - Delete all (write)
//! DELETE /api/v1/lamoda/products/{category}  - Delete category (write)
//!
//! # api.v1.twitch.games
//! POST   /api/v1/twitch/games                - Fetch top games (write)
//! GET    /api/v1/twitch/games                - List games (read)
//! DELETE /api/v1/twitch/games                - Delete all (write)
//!
//! # api.v1.twitch.users
//! POST   /api/v1/twitch/users/{login}        - Fetch user (write)
//! GET    /api/v1/twitch/users                - List users (read)
//! GET    /api/v1/twitch/users/{login}        - Get user (read)
//! DELETE /api/v1/twitch/users/{login}        - Delete user (write)
//!
//! # api.v1.twitch.streams
//! POST   /api/v1/twitch/streams              - Fetch live streams (write)
//! GET    /api/v1/twitch/streams              - List streams (read)
//! DELETE /api/v1/twitch/streams              - Delete all (write)
//! ```

pub mod health;
pub mod lamoda;
pub mod twitch;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::container::{
    LAMODA_PRODUCTS_MODULE, TWITCH_GAMES_MODULE, TWITCH_STREAMS_MODULE, TWITCH_USERS_MODULE,
};
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the `api.v1.lamoda.products` router.
pub fn lamoda_products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(lamoda::list).delete(lamoda::delete_all))
        .route(
            "/{category}",
            post(lamoda::parse)
                .get(lamoda::list_by_category)
                .delete(lamoda::delete_by_category),
        )
}

/// Create the `api.v1.twitch.games` router.
pub fn twitch_games_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        post(twitch::parse_games)
            .get(twitch::list_games)
            .delete(twitch::delete_games),
    )
}

/// Create the `api.v1.twitch.users` router.
pub fn twitch_users_routes() -> Router<AppState> {
    Router::new().route("/", get(twitch::list_users)).route(
        "/{login}",
        post(twitch::parse_user)
            .get(twitch::get_user)
            .delete(twitch::delete_user),
    )
}

/// Create the `api.v1.twitch.streams` router.
pub fn twitch_streams_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        post(twitch::parse_streams)
            .get(twitch::list_streams)
            .delete(twitch::delete_streams),
    )
}

/// Create the main routes router, one nest per wired module.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest(LAMODA_PRODUCTS_MODULE.path, lamoda_products_routes())
        .nest(TWITCH_GAMES_MODULE.path, twitch_games_routes())
        .nest(TWITCH_USERS_MODULE.path, twitch_users_routes())
        .nest(TWITCH_STREAMS_MODULE.path, twitch_streams_routes())
}

/// Build the full application: routes, middleware and state.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
