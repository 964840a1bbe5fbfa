//! Lamoda catalog scraper.
//!
//! # Architecture
//!
//! - Lamoda has no public catalog API, so catalog pages are fetched as HTML
//! - Product cards are extracted with regular expressions (see [`parser`])
//! - Pages are fetched sequentially until `LAMODA_MAX_PAGES` or the first
//!   page without product cards
//!
//! # Example
//!
//! ```rust,ignore
//! use tlparser_api::lamoda::LamodaClient;
//!
//! let client = LamodaClient::new(http, &config.lamoda);
//! let products = client.fetch_category(&Category::parse("4153")?).await?;
//! ```

mod client;
pub mod parser;

pub use client::LamodaClient;

use thiserror::Error;

/// Errors that can occur when scraping Lamoda.
#[derive(Debug, Error)]
pub enum LamodaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A catalog URL could not be built.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// The category page does not exist.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Rate limited by Lamoda.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Lamoda answered with an unexpected status.
    #[error("Unexpected status {status} for {url}")]
    Status { status: u16, url: String },
}
