//! Twitch app access token.
//!
//! Obtained with the client-credentials grant:
//!
//! ```text
//! POST {TWITCH_AUTH_URL}/oauth2/token
//!   client_id=...&client_secret=...&grant_type=client_credentials
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::instrument;
use url::Url;

use super::TwitchError;
use crate::config::TwitchConfig;

/// Seconds before expiry at which a token is treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// App access token issued by the Twitch OAuth server.
#[derive(Debug, Clone)]
pub struct AppAccessToken {
    /// Bearer token for Helix requests.
    pub access_token: SecretString,
    /// Unix timestamp when the token expires.
    pub expires_at: i64,
}

impl AppAccessToken {
    /// Check if the token has expired or will within the next minute.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at - EXPIRY_MARGIN_SECS
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Token lifetime in seconds.
    expires_in: i64,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Process-wide holder of the Twitch app access token.
///
/// Fetches a token on first use and renews it when it is about to expire
/// or after Helix rejects it.
pub struct TwitchApiToken {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    auth_url: Url,
    token: RwLock<Option<AppAccessToken>>,
}

impl std::fmt::Debug for TwitchApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitchApiToken")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("auth_url", &self.auth_url.as_str())
            .finish_non_exhaustive()
    }
}

impl TwitchApiToken {
    /// Create a token holder. No request is made until a token is needed.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &TwitchConfig) -> Self {
        Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url: config.auth_url.clone(),
            token: RwLock::new(None),
        }
    }

    /// Application client ID, sent as the `Client-Id` header.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Get a valid access token, fetching a new one if needed.
    ///
    /// # Errors
    ///
    /// Returns `TwitchError::AuthenticationFailed` if the OAuth server
    /// rejects the client credentials.
    pub async fn access_token(&self) -> Result<SecretString, TwitchError> {
        if let Some(token) = self.token.read().await.as_ref()
            && !token.is_expired()
        {
            return Ok(token.access_token.clone());
        }

        let mut guard = self.token.write().await;

        // Another task may have renewed it while we waited for the lock
        if let Some(token) = guard.as_ref()
            && !token.is_expired()
        {
            return Ok(token.access_token.clone());
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *guard = Some(token);

        Ok(access_token)
    }

    /// Drop the cached token so the next call fetches a fresh one.
    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }

    fn token_url(&self) -> Result<Url, TwitchError> {
        Ok(self.auth_url.join("/oauth2/token")?)
    }

    #[instrument(skip(self), fields(client_id = %self.client_id))]
    async fn request_token(&self) -> Result<AppAccessToken, TwitchError> {
        let now = chrono::Utc::now().timestamp();

        let response = self
            .client
            .post(self.token_url()?)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let body: TokenResponse = response.json().await?;
            tracing::info!(expires_in = body.expires_in, "Twitch app access token issued");

            Ok(AppAccessToken {
                access_token: SecretString::from(body.access_token),
                expires_at: now + body.expires_in,
            })
        } else {
            let message = response
                .json::<TokenErrorResponse>()
                .await
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| "Invalid client credentials".to_string());

            Err(TwitchError::AuthenticationFailed(format!(
                "HTTP {status}: {message}"
            )))
        }
    }
}

#[cfg(test)]
impl TwitchApiToken {
    /// Seed the cache, skipping the OAuth round trip.
    pub(crate) async fn set_token(&self, token: AppAccessToken) {
        *self.token.write().await = Some(token);
    }
}
