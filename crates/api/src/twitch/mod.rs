//! Twitch Helix API client.
//!
//! # Architecture
//!
//! - App access token from the OAuth client-credentials grant, cached in
//!   memory by [`TwitchApiToken`] and shared by every Twitch service
//! - Thin REST helpers over `helix/games/top`, `helix/users` and
//!   `helix/streams` in [`HelixClient`]
//! - Helix payloads are converted into `tlparser-core` entities in
//!   [`conversions`], stamping the time they were fetched
//!
//! # Rate limits
//!
//! Helix allows 800 points per minute per app token. A 429 surfaces as
//! [`TwitchError::RateLimited`] carrying the seconds until the bucket resets.

pub mod conversions;
mod helix;
mod token;

pub use helix::HelixClient;
pub use token::{AppAccessToken, TwitchApiToken};

use thiserror::Error;

/// Errors that can occur when interacting with the Twitch API.
#[derive(Debug, Error)]
pub enum TwitchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A Helix URL could not be built.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// The client-credentials grant was rejected.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Rate limited by Twitch.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Helix answered with an error status.
    #[error("Helix returned {status}: {message}")]
    Api { status: u16, message: String },
}
