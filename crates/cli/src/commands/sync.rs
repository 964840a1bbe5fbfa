//! Store synchronization commands.
//!
//! # Usage
//!
//! ```bash
//! tlparser-cli sync elastic
//! ```
//!
//! Rebuilds every Elasticsearch index from MongoDB. Run it once after
//! switching `READ_BACKEND` to `elastic`; from then on write services
//! mirror into Elasticsearch themselves.

use tlparser_api::container::Container;
use tlparser_api::services::sync;

use super::CommandError;

/// Copy every MongoDB collection into its Elasticsearch index.
///
/// # Errors
///
/// Returns `CommandError::Service` if either store fails.
pub async fn elastic(container: &Container) -> Result<(), CommandError> {
    tracing::info!(url = %container.elastic().base_url(), "Syncing Elasticsearch from MongoDB...");

    let products = sync::copy_products(
        &container.lamoda_products_mongo_repository()?,
        &container.lamoda_products_elastic_repository()?,
    )
    .await?;
    tracing::info!(products, "Lamoda products synced");

    let games = sync::copy_games(
        &container.twitch_game_mongo_repository()?,
        &container.twitch_game_elastic_repository()?,
    )
    .await?;
    tracing::info!(games, "Twitch games synced");

    let users = sync::copy_users(
        &container.twitch_user_mongo_repository()?,
        &container.twitch_user_elastic_repository()?,
    )
    .await?;
    tracing::info!(users, "Twitch users synced");

    let streams = sync::copy_streams(
        &container.twitch_stream_mongo_repository()?,
        &container.twitch_stream_elastic_repository()?,
    )
    .await?;
    tracing::info!(streams, "Twitch streams synced");

    tracing::info!("Elasticsearch sync complete!");
    Ok(())
}
