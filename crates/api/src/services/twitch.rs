//! Twitch services: games, users and streams.

use std::sync::Arc;

use tracing::instrument;

use tlparser_core::{TwitchGame, TwitchLogin, TwitchStream, TwitchUser};

use super::ServiceError;
use crate::db::{GameRepository, StreamRepository, UserRepository};
use crate::twitch::HelixClient;

/// Number of top games fetched per parse.
const TOP_GAMES_LIMIT: usize = 100;

/// Number of live streams fetched per parse.
const STREAMS_LIMIT: usize = 100;

// =============================================================================
// Games
// =============================================================================

pub struct TwitchGameService {
    repository: Arc<dyn GameRepository>,
    mirror: Option<Arc<dyn GameRepository>>,
    helix: HelixClient,
}

impl TwitchGameService {
    #[must_use]
    pub fn new(repository: Arc<dyn GameRepository>, helix: HelixClient) -> Self {
        Self {
            repository,
            mirror: None,
            helix,
        }
    }

    /// Repeat every write on `mirror` after it succeeds on the repository.
    #[must_use]
    pub fn with_mirror(mut self, mirror: Arc<dyn GameRepository>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    #[must_use]
    pub fn repository(&self) -> &Arc<dyn GameRepository> {
        &self.repository
    }

    #[must_use]
    pub fn mirror(&self) -> Option<&Arc<dyn GameRepository>> {
        self.mirror.as_ref()
    }

    #[must_use]
    pub const fn helix(&self) -> &HelixClient {
        &self.helix
    }

    /// Fetch the current top games and store them.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Twitch` if Helix fails and
    /// `ServiceError::Repository` if storing fails.
    #[instrument(skip(self), fields(backend = %self.repository.backend()))]
    pub async fn parse_games(&self) -> Result<u64, ServiceError> {
        let games = self.helix.top_games(TOP_GAMES_LIMIT).await?;
        let saved = self.repository.save_many(&games).await?;
        if let Some(mirror) = &self.mirror {
            mirror.save_many(&games).await?;
        }

        tracing::info!(saved, "Twitch games stored");
        Ok(saved)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn get_all_games(&self) -> Result<Vec<TwitchGame>, ServiceError> {
        Ok(self.repository.find_all().await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete_all_games(&self) -> Result<u64, ServiceError> {
        let deleted = self.repository.delete_all().await?;
        if let Some(mirror) = &self.mirror {
            mirror.delete_all().await?;
        }
        Ok(deleted)
    }
}

// =============================================================================
// Users
// =============================================================================

pub struct TwitchUserService {
    repository: Arc<dyn UserRepository>,
    mirror: Option<Arc<dyn UserRepository>>,
    helix: HelixClient,
}

impl TwitchUserService {
    #[must_use]
    pub fn new(repository: Arc<dyn UserRepository>, helix: HelixClient) -> Self {
        Self {
            repository,
            mirror: None,
            helix,
        }
    }

    /// Repeat every write on `mirror` after it succeeds on the repository.
    #[must_use]
    pub fn with_mirror(mut self, mirror: Arc<dyn UserRepository>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    #[must_use]
    pub fn repository(&self) -> &Arc<dyn UserRepository> {
        &self.repository
    }

    #[must_use]
    pub fn mirror(&self) -> Option<&Arc<dyn UserRepository>> {
        self.mirror.as_ref()
    }

    #[must_use]
    pub const fn helix(&self) -> &HelixClient {
        &self.helix
    }

    /// Fetch a user from Helix and store it.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if Twitch has no user with this login.
    #[instrument(skip(self), fields(login = %login))]
    pub async fn parse_user(&self, login: &TwitchLogin) -> Result<TwitchUser, ServiceError> {
        let user = self
            .helix
            .user_by_login(login)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("twitch user {login}")))?;

        self.repository.save(&user).await?;
        if let Some(mirror) = &self.mirror {
            mirror.save(&user).await?;
        }
        tracing::info!(user_id = %user.id, "Twitch user stored");

        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn get_all_users(&self) -> Result<Vec<TwitchUser>, ServiceError> {
        Ok(self.repository.find_all().await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user was never parsed.
    pub async fn get_user(&self, login: &TwitchLogin) -> Result<TwitchUser, ServiceError> {
        self.repository
            .find_by_login(login)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("twitch user {login}")))
    }

    /// Returns the number of deleted users (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the delete fails.
    #[instrument(skip(self), fields(login = %login))]
    pub async fn delete_user(&self, login: &TwitchLogin) -> Result<u64, ServiceError> {
        let deleted = self.repository.delete_by_login(login).await?;
        if let Some(mirror) = &self.mirror {
            mirror.delete_by_login(login).await?;
        }
        Ok(u64::from(deleted))
    }
}

// =============================================================================
// Streams
// =============================================================================

pub struct TwitchStreamService {
    repository: Arc<dyn StreamRepository>,
    mirror: Option<Arc<dyn StreamRepository>>,
    helix: HelixClient,
}

impl TwitchStreamService {
    #[must_use]
    pub fn new(repository: Arc<dyn StreamRepository>, helix: HelixClient) -> Self {
        Self {
            repository,
            mirror: None,
            helix,
        }
    }

    /// Repeat every write on `mirror` after it succeeds on the repository.
    #[must_use]
    pub fn with_mirror(mut self, mirror: Arc<dyn StreamRepository>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    #[must_use]
    pub fn repository(&self) -> &Arc<dyn StreamRepository> {
        &self.repository
    }

    #[must_use]
    pub fn mirror(&self) -> Option<&Arc<dyn StreamRepository>> {
        self.mirror.as_ref()
    }

    #[must_use]
    pub const fn helix(&self) -> &HelixClient {
        &self.helix
    }

    /// Fetch the most watched live streams and store them.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Twitch` if Helix fails and
    /// `ServiceError::Repository` if storing fails.
    #[instrument(skip(self), fields(backend = %self.repository.backend()))]
    pub async fn parse_streams(&self) -> Result<u64, ServiceError> {
        let streams = self.helix.streams(STREAMS_LIMIT).await?;
        let saved = self.repository.save_many(&streams).await?;
        if let Some(mirror) = &self.mirror {
            mirror.save_many(&streams).await?;
        }

        tracing::info!(saved, "Twitch streams stored");
        Ok(saved)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn get_all_streams(&self) -> Result<Vec<TwitchStream>, ServiceError> {
        Ok(self.repository.find_all().await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete_all_streams(&self) -> Result<u64, ServiceError> {
        let deleted = self.repository.delete_all().await?;
        if let Some(mirror) = &self.mirror {
            mirror.delete_all().await?;
        }
        Ok(deleted)
    }
}
