//! Twitch user repositories.
//!
//! Users are looked up by login, so login (not the numeric Twitch ID) is
//! the key in both stores.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use serde_json::json;

use tlparser_core::{StorageBackend, TwitchLogin, TwitchUser};

use super::elastic::MAX_SEARCH_SIZE;
use super::{ElasticSearchDatabase, MongoDatabase, RepositoryError, TWITCH_USERS};

/// Storage of Twitch users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert or replace a user by login.
    async fn save(&self, user: &TwitchUser) -> Result<(), RepositoryError>;

    async fn find_all(&self) -> Result<Vec<TwitchUser>, RepositoryError>;

    async fn find_by_login(&self, login: &TwitchLogin)
    -> Result<Option<TwitchUser>, RepositoryError>;

    /// Returns `false` if no user with this login was stored.
    async fn delete_by_login(&self, login: &TwitchLogin) -> Result<bool, RepositoryError>;

    fn backend(&self) -> StorageBackend;
}

/// Users stored in the `twitch_users` collection.
pub struct TwitchUserMongoRepository {
    db: Arc<MongoDatabase>,
}

impl TwitchUserMongoRepository {
    #[must_use]
    pub const fn new(db: Arc<MongoDatabase>) -> Self {
        Self { db }
    }

    #[must_use]
    pub const fn database(&self) -> &Arc<MongoDatabase> {
        &self.db
    }

    fn collection(&self) -> mongodb::Collection<TwitchUser> {
        self.db.collection(TWITCH_USERS)
    }
}

#[async_trait]
impl UserRepository for TwitchUserMongoRepository {
    async fn save(&self, user: &TwitchUser) -> Result<(), RepositoryError> {
        self.collection()
            .replace_one(doc! { "login": user.login.as_str() }, user)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<TwitchUser>, RepositoryError> {
        let cursor = self.collection().find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_login(
        &self,
        login: &TwitchLogin,
    ) -> Result<Option<TwitchUser>, RepositoryError> {
        Ok(self
            .collection()
            .find_one(doc! { "login": login.as_str() })
            .await?)
    }

    async fn delete_by_login(&self, login: &TwitchLogin) -> Result<bool, RepositoryError> {
        let result = self
            .collection()
            .delete_one(doc! { "login": login.as_str() })
            .await?;
        Ok(result.deleted_count > 0)
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Mongo
    }
}

/// Users stored in the `twitch_users` index, document ID = login.
pub struct TwitchUserElasticRepository {
    es: Arc<ElasticSearchDatabase>,
}

impl TwitchUserElasticRepository {
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
impl UserRepository for TwitchUserElasticRepository {
    async fn save(&self, user: &TwitchUser) -> Result<(), RepositoryError> {
        self.es
            .bulk_index(TWITCH_USERS, &[(user.login.clone(), user)])
            .await?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<TwitchUser>, RepositoryError> {
        self.es
            .search(TWITCH_USERS, json!({ "match_all": {} }), MAX_SEARCH_SIZE)
            .await
    }

    async fn find_by_login(
        &self,
        login: &TwitchLogin,
    ) -> Result<Option<TwitchUser>, RepositoryError> {
        self.es.get(TWITCH_USERS, login.as_str()).await
    }

    async fn delete_by_login(&self, login: &TwitchLogin) -> Result<bool, RepositoryError> {
        self.es.delete(TWITCH_USERS, login.as_str()).await
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Elastic
    }
}
