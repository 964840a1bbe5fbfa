//! Twitch stream repositories.
//!
//! A stream snapshot is keyed by stream ID; re-parsing updates viewer
//! counts of streams that are still live.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use serde_json::json;

use tlparser_core::{StorageBackend, TwitchStream};

use super::elastic::MAX_SEARCH_SIZE;
use super::{ElasticSearchDatabase, MongoDatabase, RepositoryError, TWITCH_STREAMS};

/// Storage of Twitch stream snapshots.
#[async_trait]
pub trait StreamRepository: Send + Sync {
    /// Insert or replace streams by ID. Returns the number saved.
    async fn save_many(&self, streams: &[TwitchStream]) -> Result<u64, RepositoryError>;

    /// All stored streams, most watched first.
    async fn find_all(&self) -> Result<Vec<TwitchStream>, RepositoryError>;

    async fn delete_all(&self) -> Result<u64, RepositoryError>;

    fn backend(&self) -> StorageBackend;
}

pub struct TwitchStreamMongoRepository {
    db: Arc<MongoDatabase>,
}

impl TwitchStreamMongoRepository {
    #[must_use]
    pub const fn new(db: Arc<MongoDatabase>) -> Self {
        Self { db }
    }

    #[must_use]
    pub const fn database(&self) -> &Arc<MongoDatabase> {
        &self.db
    }

    fn collection(&self) -> mongodb::Collection<TwitchStream> {
        self.db.collection(TWITCH_STREAMS)
    }
}

#[async_trait]
impl StreamRepository for TwitchStreamMongoRepository {
    async fn save_many(&self, streams: &[TwitchStream]) -> Result<u64, RepositoryError> {
        let collection = self.collection();

        for stream in streams {
            collection
                .replace_one(doc! { "id": stream.id.as_str() }, stream)
                .upsert(true)
                .await?;
        }

        Ok(streams.len() as u64)
    }

    async fn find_all(&self) -> Result<Vec<TwitchStream>, RepositoryError> {
        let cursor = self
            .collection()
            .find(doc! {})
            .sort(doc! { "viewer_count": -1 })
            .await?;
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

pub struct TwitchStreamElasticRepository {
    es: Arc<ElasticSearchDatabase>,
}

impl TwitchStreamElasticRepository {
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
impl StreamRepository for TwitchStreamElasticRepository {
    async fn save_many(&self, streams: &[TwitchStream]) -> Result<u64, RepositoryError> {
        let docs: Vec<(String, &TwitchStream)> =
            streams.iter().map(|s| (s.id.to_string(), s)).collect();

        self.es.bulk_index(TWITCH_STREAMS, &docs).await
    }

    async fn find_all(&self) -> Result<Vec<TwitchStream>, RepositoryError> {
        let mut streams: Vec<TwitchStream> = self
            .es
            .search(TWITCH_STREAMS, json!({ "match_all": {} }), MAX_SEARCH_SIZE)
            .await?;

        streams.sort_by(|a, b| b.viewer_count.cmp(&a.viewer_count));
        Ok(streams)
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        self.es
            .delete_by_query(TWITCH_STREAMS, json!({ "match_all": {} }))
            .await
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Elastic
    }
}
