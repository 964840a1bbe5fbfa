//! Copy stored entities between repositories.
//!
//! Rebuilds the Elasticsearch read store from MongoDB, e.g. for data that
//! was written before reads moved to Elasticsearch. The target is cleared
//! first, so entities removed from the source disappear from it too.

use tracing::instrument;

use tlparser_core::TwitchLogin;

use super::ServiceError;
use crate::db::{GameRepository, ProductsRepository, StreamRepository, UserRepository};

/// Returns the number of products copied.
///
/// # Errors
///
/// Returns `ServiceError::Repository` if either store fails.
#[instrument(skip_all, fields(from = %source.backend(), to = %target.backend()))]
pub async fn copy_products(
    source: &dyn ProductsRepository,
    target: &dyn ProductsRepository,
) -> Result<u64, ServiceError> {
    let products = source.find_all().await?;
    target.delete_all().await?;

    if products.is_empty() {
        return Ok(0);
    }
    Ok(target.save_many(&products).await?)
}

/// Returns the number of games copied.
///
/// # Errors
///
/// Returns `ServiceError::Repository` if either store fails.
#[instrument(skip_all, fields(from = %source.backend(), to = %target.backend()))]
pub async fn copy_games(
    source: &dyn GameRepository,
    target: &dyn GameRepository,
) -> Result<u64, ServiceError> {
    let games = source.find_all().await?;
    target.delete_all().await?;

    if games.is_empty() {
        return Ok(0);
    }
    Ok(target.save_many(&games).await?)
}

/// Returns the number of streams copied.
///
/// # Errors
///
/// Returns `ServiceError::Repository` if either store fails.
#[instrument(skip_all, fields(from = %source.backend(), to = %target.backend()))]
pub async fn copy_streams(
    source: &dyn StreamRepository,
    target: &dyn StreamRepository,
) -> Result<u64, ServiceError> {
    let streams = source.find_all().await?;
    target.delete_all().await?;

    if streams.is_empty() {
        return Ok(0);
    }
    Ok(target.save_many(&streams).await?)
}

/// Users have no bulk delete, so stale target users are removed one by one.
///
/// Returns the number of users copied.
///
/// # Errors
///
/// Returns `ServiceError::Repository` if either store fails.
#[instrument(skip_all, fields(from = %source.backend(), to = %target.backend()))]
pub async fn copy_users(
    source: &dyn UserRepository,
    target: &dyn UserRepository,
) -> Result<u64, ServiceError> {
    let users = source.find_all().await?;

    for stale in target.find_all().await? {
        if !users.iter().any(|u| u.login == stale.login) {
            let login = TwitchLogin::parse(&stale.login)?;
            target.delete_by_login(&login).await?;
        }
    }

    for user in &users {
        target.save(user).await?;
    }
    Ok(u64::try_from(users.len()).unwrap_or(u64::MAX))
}
