//! Twitch game repositories.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use serde_json::json;

use tlparser_core::{StorageBackend, TwitchGame};

use super::elastic::MAX_SEARCH_SIZE;
use super::{ElasticSearchDatabase, MongoDatabase, RepositoryError, TWITCH_GAMES};

/// Storage of Twitch games, keyed by game ID.
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Insert or replace games by ID. Returns the number saved.
    async fn save_many(&self, games: &[TwitchGame]) -> Result<u64, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<TwitchGame>, RepositoryError>;

    /// Returns the number of deleted games.
    async fn delete_all(&self) -> Result<u64, RepositoryError>;

    fn backend(&self) -> StorageBackend;
}

/// Games stored in the `twitch_games` collection.
pub struct TwitchGameMongoRepository {
    db: Arc<MongoDatabase>,
}

impl TwitchGameMongoRepository {
    #[must_use]
    pub const fn new(db: Arc<MongoDatabase>) -> Self {
        Self { db }
    }

    #[must_use]
    pub const fn database(&self) -> &Arc<MongoDatabase> {
        &self.db
    }

    fn collection(&self) -> mongodb::Collection<TwitchGame> {
        self.db.collection(TWITCH_GAMES)
    }
}

#[async_trait]
impl GameRepository for TwitchGameMongoRepository {
    async fn save_many(&self, games: &[TwitchGame]) -> Result<u64, RepositoryError> {
        let collection = self.collection();

        for game in games {
            collection
                .replace_one(doc! { "id": game.id.as_str() }, game)
                .upsert(true)
                .await?;
        }

        Ok(games.len() as u64)
    }

    async fn find_all(&self) -> Result<Vec<TwitchGame>, RepositoryError> {
        let cursor = self.collection().find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = self.collection().delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Mongo
    }
}

/// Games stored in the `twitch_games` index, document ID = game ID.
pub struct TwitchGameElasticRepository {
    es: Arc<ElasticSearchDatabase>,
}

impl TwitchGameElasticRepository {
    #[must_use]
    pub const fn new(es: Arc<ElasticSearchDatabase>) -> Self {
        Self { es }
    }

    #[must_use]
    pub const fn database(&self) -> &Arc<ElasticSearchDatabase> {
        &self.es
    }
}

#[async_trait]
impl GameRepository for TwitchGameElasticRepository {
    async fn save_many(&self, games: &[TwitchGame]) -> Result<u64, RepositoryError> {
        let docs: Vec<(String, &TwitchGame)> =
            games.iter().map(|g| (g.id.to_string(), g)).collect();

        self.es.bulk_index(TWITCH_GAMES, &docs).await
    }

    async fn find_all(&self) -> Result<Vec<TwitchGame>, RepositoryError> {
        self.es
            .search(TWITCH_GAMES, json!({ "match_all": {} }), MAX_SEARCH_SIZE)
            .await
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        self.es
            .delete_by_query(TWITCH_GAMES, json!({ "match_all": {} }))
            .await
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Elastic
    }
}
