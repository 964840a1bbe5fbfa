//! Integration tests for tlparser.
//!
//! # Running Tests
//!
//! ```bash
//! # Start MongoDB and Elasticsearch, then create indexes
//! cargo run -p tlparser-cli -- setup all
//!
//! # Start the API
//! cargo run -p tlparser-api
//!
//! # Run integration tests
//! cargo test -p tlparser-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `api_health` - Liveness and readiness
//! - `api_lamoda` - Lamoda products endpoints (scrapes lamoda.ru)
//! - `api_twitch` - Twitch endpoints (needs Twitch app credentials)

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// HTTP client for talking to the API. Parses can take a while.
///
/// # Panics
///
/// Panics if the HTTP client cannot be created.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .expect("Failed to create HTTP client")
}

/// Assert a response status and decode its JSON body.
///
/// # Panics
///
/// Panics if the status differs or the body is not valid JSON for `T`.
pub async fn expect_json<T: DeserializeOwned>(resp: Response, status: StatusCode) -> T {
    let actual = resp.status();
    let body = resp.text().await.expect("Failed to read response");
    assert_eq!(actual, status, "unexpected status, body: {body}");
    serde_json::from_str(&body).expect("Response is not the expected JSON")
}
