//! One-off parse commands.
//!
//! Each command resolves the same write service the HTTP API uses, so
//! results land in MongoDB exactly as a `POST` would store them.

use tlparser_api::container::Container;
use tlparser_core::{Category, TwitchLogin};

use super::CommandError;

/// Scrape a Lamoda category.
///
/// # Errors
///
/// Returns `CommandError::Service` if scraping or storing fails.
pub async fn lamoda(container: &Container, category: &Category) -> Result<(), CommandError> {
    let service = container.lamoda_products_w_service()?;
    let parsed = service.parse_products(category).await?;

    tracing::info!(%category, parsed, "Lamoda category parsed");
    Ok(())
}

/// Fetch the top Twitch games.
///
/// # Errors
///
/// Returns `CommandError::Service` if Helix or MongoDB fails.
pub async fn twitch_games(container: &Container) -> Result<(), CommandError> {
    let parsed = container.twitch_game_w_service()?.parse_games().await?;

    tracing::info!(parsed, "Twitch games parsed");
    Ok(())
}

/// Fetch the most watched live Twitch streams.
///
/// # Errors
///
/// Returns `CommandError::Service` if Helix or MongoDB fails.
pub async fn twitch_streams(container: &Container) -> Result<(), CommandError> {
    let parsed = container.twitch_stream_w_service()?.parse_streams().await?;

    tracing::info!(parsed, "Twitch streams parsed");
    Ok(())
}

/// Fetch a single Twitch user.
///
/// # Errors
///
/// Returns `CommandError::Service` with `NotFound` if Twitch has no such user.
pub async fn twitch_user(container: &Container, login: &TwitchLogin) -> Result<(), CommandError> {
    let user = container.twitch_user_w_service()?.parse_user(login).await?;

    tracing::info!(login = %user.login, id = %user.id, "Twitch user parsed");
    Ok(())
}
