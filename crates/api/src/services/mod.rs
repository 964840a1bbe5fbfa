//! Business logic services.
//!
//! # Services
//!
//! - `lamoda` - scrape catalog categories and manage stored products
//! - `twitch` - fetch games, users and streams from Helix and manage them
//! - `sync` - copy stored entities from one store into another
//!
//! Every service is constructed twice by the container: a write instance
//! over the MongoDB repository and a read instance over the repository
//! selected by `READ_BACKEND`. The type is the same; only the injected
//! repository differs. Write instances may carry a mirror repository that
//! receives every write after the primary.

mod lamoda;
pub mod sync;
mod twitch;

pub use lamoda::LamodaProductsService;
pub use twitch::{TwitchGameService, TwitchStreamService, TwitchUserService};

use thiserror::Error;

use tlparser_core::SlugError;

use crate::db::RepositoryError;
use crate::lamoda::LamodaError;
use crate::twitch::TwitchError;

/// Errors that can occur in service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Scraping Lamoda failed.
    #[error("lamoda error: {0}")]
    Lamoda(#[from] LamodaError),

    /// Calling Twitch failed.
    #[error("twitch error: {0}")]
    Twitch(#[from] TwitchError),

    /// Requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller supplied an invalid category or login.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] SlugError),
}
