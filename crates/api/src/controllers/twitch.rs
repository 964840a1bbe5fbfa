use tlparser_core::{TwitchGame, TwitchLogin, TwitchStream, TwitchUser};

use super::{DeletedResponse, ParsedResponse};
use crate::error::Result;
use crate::services::{ServiceError, TwitchGameService, TwitchStreamService, TwitchUserService};

pub struct TwitchGameController {
    service: TwitchGameService,
}

impl TwitchGameController {
    #[must_use]
    pub const fn new(service: TwitchGameService) -> Self {
        Self { service }
    }

    #[must_use]
    pub const fn service(&self) -> &TwitchGameService {
        &self.service
    }

    /// # Errors
    ///
    /// Returns `AppError::Upstream` if Helix fails.
    pub async fn parse(&self) -> Result<ParsedResponse> {
        let parsed = self.service.parse_games().await?;
        Ok(ParsedResponse { parsed })
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<TwitchGame>> {
        Ok(self.service.get_all_games().await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the delete fails.
    pub async fn delete_all(&self) -> Result<DeletedResponse> {
        let deleted = self.service.delete_all_games().await?;
        Ok(DeletedResponse { deleted })
    }
}

pub struct TwitchUserController {
    service: TwitchUserService,
}

impl TwitchUserController {
    #[must_use]
    pub const fn new(service: TwitchUserService) -> Self {
        Self { service }
    }

    #[must_use]
    pub const fn service(&self) -> &TwitchUserService {
        &self.service
    }

    /// Fetch and store a user, returning it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an invalid login and
    /// `AppError::NotFound` if Twitch has no such user.
    pub async fn parse(&self, login: &str) -> Result<TwitchUser> {
        let login = parse_login(login)?;
        Ok(self.service.parse_user(&login).await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<TwitchUser>> {
        Ok(self.service.get_all_users().await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the user was never parsed.
    pub async fn get(&self, login: &str) -> Result<TwitchUser> {
        let login = parse_login(login)?;
        Ok(self.service.get_user(&login).await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an invalid login.
    pub async fn delete(&self, login: &str) -> Result<DeletedResponse> {
        let login = parse_login(login)?;
        let deleted = self.service.delete_user(&login).await?;
        Ok(DeletedResponse { deleted })
    }
}

pub struct TwitchStreamController {
    service: TwitchStreamService,
}

impl TwitchStreamController {
    #[must_use]
    pub const fn new(service: TwitchStreamService) -> Self {
        Self { service }
    }

    #[must_use]
    pub const fn service(&self) -> &TwitchStreamService {
        &self.service
    }

    /// # Errors
    ///
    /// Returns `AppError::Upstream` if Helix fails.
    pub async fn parse(&self) -> Result<ParsedResponse> {
        let parsed = self.service.parse_streams().await?;
        Ok(ParsedResponse { parsed })
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<TwitchStream>> {
        Ok(self.service.get_all_streams().await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the delete fails.
    pub async fn delete_all(&self) -> Result<DeletedResponse> {
        let deleted = self.service.delete_all_streams().await?;
        Ok(DeletedResponse { deleted })
    }
}

fn parse_login(raw: &str) -> std::result::Result<TwitchLogin, ServiceError> {
    Ok(TwitchLogin::parse(raw)?)
}
