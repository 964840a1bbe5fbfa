//! Controllers: the seam between HTTP handlers and services.
//!
//! A controller validates raw path input, calls its service and shapes the
//! result into a response body. Errors leave as [`AppError`](crate::error::AppError).

mod lamoda;
mod twitch;

pub use lamoda::LamodaProductsController;
pub use twitch::{TwitchGameController, TwitchStreamController, TwitchUserController};

use serde::{Deserialize, Serialize};

/// Body returned by parse operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResponse {
    pub parsed: u64,
}

/// Body returned by delete operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}
