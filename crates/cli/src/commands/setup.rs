//! Store setup commands.
//!
//! # Usage
//!
//! ```bash
//! tlparser-cli setup mongo
//! tlparser-cli setup elastic
//! tlparser-cli setup all
//! ```
//!
//! Both commands are idempotent and safe to re-run.

use tlparser_api::container::Container;
use tlparser_api::db::ALL_COLLECTIONS;

use super::CommandError;

/// Create the MongoDB indexes every repository relies on.
///
/// # Errors
///
/// Returns `CommandError::Repository` if the server is unreachable or
/// rejects an index.
pub async fn mongo(container: &Container) -> Result<(), CommandError> {
    let db = container.mongo();

    tracing::info!(db = db.name(), "Connecting to MongoDB...");
    db.ping().await?;

    tracing::info!("Creating MongoDB indexes...");
    db.ensure_indexes().await?;

    tracing::info!("MongoDB setup complete!");
    Ok(())
}

/// Create one Elasticsearch index per collection.
///
/// # Errors
///
/// Returns `CommandError::Repository` if Elasticsearch is unreachable or
/// refuses to create an index.
pub async fn elastic(container: &Container) -> Result<(), CommandError> {
    let es = container.elastic();

    tracing::info!(url = %es.base_url(), "Connecting to Elasticsearch...");
    es.ping().await?;

    for index in ALL_COLLECTIONS {
        if es.ensure_index(index).await? {
            tracing::info!(index, "Index created");
        } else {
            tracing::info!(index, "Index already exists");
        }
    }

    tracing::info!("Elasticsearch setup complete!");
    Ok(())
}
