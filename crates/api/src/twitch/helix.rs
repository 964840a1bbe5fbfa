//! Helix REST helpers.

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use tlparser_core::{TwitchGame, TwitchLogin, TwitchStream, TwitchUser};

use super::conversions::{HelixGame, HelixStream, HelixUser, convert_game, convert_stream, convert_user};
use super::{TwitchApiToken, TwitchError};

/// Largest page Helix serves.
const MAX_PAGE_SIZE: usize = 100;

/// Helix list envelope: `{ "data": [...], "pagination": { "cursor": "..." } }`.
#[derive(Debug, Deserialize)]
struct HelixPage<T> {
    data: Vec<T>,
    #[serde(default)]
    pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
struct Pagination {
    #[serde(default)]
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HelixErrorResponse {
    #[serde(default)]
    message: String,
}

/// Client for the Helix endpoints tlparser uses.
///
/// Every request carries `Authorization: Bearer <app token>` and
/// `Client-Id`. A 401 drops the cached token and the request is retried
/// once with a fresh one.
#[derive(Debug, Clone)]
pub struct HelixClient {
    client: reqwest::Client,
    token: Arc<TwitchApiToken>,
    api_url: Url,
}

impl HelixClient {
    #[must_use]
    pub fn new(client: reqwest::Client, token: Arc<TwitchApiToken>, api_url: Url) -> Self {
        Self {
            client,
            token,
            api_url,
        }
    }

    /// Shared app access token.
    #[must_use]
    pub const fn token(&self) -> &Arc<TwitchApiToken> {
        &self.token
    }

    /// Most watched games right now, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns `TwitchError` if any page request fails.
    #[instrument(skip(self))]
    pub async fn top_games(&self, limit: usize) -> Result<Vec<TwitchGame>, TwitchError> {
        let parsed_at = chrono::Utc::now();
        let games: Vec<HelixGame> = self.get_paginated("helix/games/top", &[], limit).await?;

        Ok(games.into_iter().map(|g| convert_game(g, parsed_at)).collect())
    }

    /// Look up a single user by login. `None` if Twitch has no such user.
    ///
    /// # Errors
    ///
    /// Returns `TwitchError` if the request fails.
    #[instrument(skip(self), fields(login = %login))]
    pub async fn user_by_login(&self, login: &TwitchLogin) -> Result<Option<TwitchUser>, TwitchError> {
        let parsed_at = chrono::Utc::now();
        let mut url = self.endpoint("helix/users")?;
        url.query_pairs_mut().append_pair("login", login.as_str());

        let page: HelixPage<HelixUser> = self.get(url).await?;

        Ok(page
            .data
            .into_iter()
            .next()
            .map(|u| convert_user(u, parsed_at)))
    }

    /// Live streams ordered by viewer count, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns `TwitchError` if any page request fails.
    #[instrument(skip(self))]
    pub async fn streams(&self, limit: usize) -> Result<Vec<TwitchStream>, TwitchError> {
        let parsed_at = chrono::Utc::now();
        let streams: Vec<HelixStream> = self.get_paginated("helix/streams", &[], limit).await?;

        Ok(streams
            .into_iter()
            .map(|s| convert_stream(s, parsed_at))
            .collect())
    }

    /// Follow `pagination.cursor` until `limit` items are collected or the
    /// listing ends.
    async fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        limit: usize,
    ) -> Result<Vec<T>, TwitchError> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;

        while items.len() < limit {
            let first = (limit - items.len()).min(MAX_PAGE_SIZE);
            let url = page_url(&self.endpoint(path)?, query, first, cursor.as_deref());

            let page: HelixPage<T> = self.get(url).await?;
            let exhausted = page.data.is_empty();
            items.extend(page.data);

            cursor = page.pagination.cursor;
            if exhausted || cursor.is_none() {
                break;
            }
        }

        items.truncate(limit);
        Ok(items)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, TwitchError> {
        match self.send(url.clone()).await {
            Err(TwitchError::Api { status: 401, .. }) => {
                tracing::warn!("Helix rejected the app token, renewing");
                self.token.invalidate().await;
                self.send(url).await
            }
            result => result,
        }
    }

    async fn send<T: DeserializeOwned>(&self, url: Url) -> Result<T, TwitchError> {
        let access_token = self.token.access_token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token.expose_secret())
            .header("Client-Id", self.token.client_id())
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let reset_at = response
                .headers()
                .get("Ratelimit-Reset")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<i64>().ok());
            return Err(TwitchError::RateLimited(retry_after(reset_at)));
        }

        if !status.is_success() {
            let message = response
                .json::<HelixErrorResponse>()
                .await
                .map(|e| e.message)
                .unwrap_or_default();
            return Err(TwitchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    fn endpoint(&self, path: &str) -> Result<Url, TwitchError> {
        Ok(self.api_url.join(path)?)
    }
}

fn page_url(endpoint: &Url, query: &[(&str, &str)], first: usize, after: Option<&str>) -> Url {
    let mut url = endpoint.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.extend_pairs(query);
        pairs.append_pair("first", &first.to_string());
        if let Some(after) = after {
            pairs.append_pair("after", after);
        }
    }
    url
}

/// Seconds until `Ratelimit-Reset`, at least one. 60 without the header.
fn retry_after(reset_at: Option<i64>) -> u64 {
    reset_at.map_or(60, |reset| {
        u64::try_from(reset - chrono::Utc::now().timestamp())
            .unwrap_or(0)
            .max(1)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use httpmock::prelude::*;
    use secrecy::SecretString;
    use serde_json::{Value, json};

    use super::*;
    use crate::config::TwitchConfig;
    use crate::twitch::AppAccessToken;

    /// Helix client whose API and OAuth server are both `server`.
    fn helix_at(server: &MockServer) -> HelixClient {
        let base = Url::parse(&server.base_url()).unwrap();
        let config = TwitchConfig {
            client_id: "client_id_value".to_string(),
            client_secret: SecretString::from("twitch_secret_value"),
            api_url: base.clone(),
            auth_url: base,
        };
        let http = reqwest::Client::new();
        let token = Arc::new(TwitchApiToken::new(http.clone(), &config));
        HelixClient::new(http, token, config.api_url)
    }

    async fn mock_token<'a>(server: &'a MockServer, access_token: &str) -> httpmock::Mock<'a> {
        server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth2/token");
                then.status(200)
                    .json_body(json!({ "access_token": access_token, "expires_in": 3600 }));
            })
            .await
    }

    fn games(from: usize, count: usize) -> Vec<Value> {
        (from..from + count)
            .map(|i| json!({ "id": i.to_string(), "name": format!("Game {i}"), "box_art_url": "x" }))
            .collect()
    }

    fn twitchdev() -> Value {
        json!({
            "id": "141981764",
            "login": "twitchdev",
            "display_name": "TwitchDev",
            "type": "",
            "broadcaster_type": "partner",
            "description": "Supporting third-party developers",
            "profile_image_url": "",
            "offline_image_url": "",
            "created_at": "2016-12-14T20:32:28Z"
        })
    }

    fn login() -> TwitchLogin {
        TwitchLogin::parse("twitchdev").unwrap()
    }

    #[test]
    fn test_page_url() {
        let endpoint = Url::parse("https://api.twitch.tv/helix/streams").unwrap();

        let url = page_url(&endpoint, &[("language", "ru")], 100, None);
        assert_eq!(url.as_str(), "https://api.twitch.tv/helix/streams?language=ru&first=100");

        let url = page_url(&endpoint, &[], 20, Some("eyJiIjpudWxs"));
        assert_eq!(
            url.as_str(),
            "https://api.twitch.tv/helix/streams?first=20&after=eyJiIjpudWxs"
        );
    }

    #[test]
    fn test_retry_after() {
        let now = chrono::Utc::now().timestamp();

        assert!((29..=30).contains(&retry_after(Some(now + 30))));
        assert_eq!(retry_after(Some(now)), 1);
        assert_eq!(retry_after(Some(now - 5)), 1);
        assert_eq!(retry_after(None), 60);
    }

    #[test]
    fn test_page_envelope_without_cursor() {
        let page: HelixPage<HelixGame> = serde_json::from_str(
            r#"{"data":[{"id":"509658","name":"Just Chatting","box_art_url":"x","igdb_id":""}],"pagination":{}}"#,
        )
        .unwrap();

        assert_eq!(page.data.len(), 1);
        assert!(page.pagination.cursor.is_none());
    }

    #[test]
    fn test_page_envelope_missing_pagination() {
        let page: HelixPage<HelixGame> = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn test_top_games_follows_cursor_and_truncates() {
        let server = MockServer::start_async().await;
        let grant = mock_token(&server, "fresh_token").await;

        let page1 = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/helix/games/top")
                    .query_param("first", "100")
                    .header("authorization", "Bearer fresh_token")
                    .header("client-id", "client_id_value");
                then.status(200)
                    .json_body(json!({ "data": games(0, 100), "pagination": { "cursor": "c1" } }));
            })
            .await;
        let page2 = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/helix/games/top")
                    .query_param("first", "50")
                    .query_param("after", "c1");
                then.status(200)
                    .json_body(json!({ "data": games(100, 60), "pagination": { "cursor": "c2" } }));
            })
            .await;

        let top = helix_at(&server).top_games(150).await.unwrap();

        assert_eq!(top.len(), 150);
        assert_eq!(top[0].id.as_str(), "0");
        assert_eq!(top[149].id.as_str(), "149");
        page1.assert_async().await;
        page2.assert_async().await;
        grant.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_top_games_stops_when_listing_ends() {
        let server = MockServer::start_async().await;
        mock_token(&server, "fresh_token").await;

        let listing = server
            .mock_async(|when, then| {
                when.method(GET).path("/helix/games/top");
                then.status(200)
                    .json_body(json!({ "data": games(0, 3), "pagination": {} }));
            })
            .await;

        let top = helix_at(&server).top_games(150).await.unwrap();

        assert_eq!(top.len(), 3);
        listing.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_unauthorized_renews_token_and_retries_once() {
        let server = MockServer::start_async().await;
        let grant = mock_token(&server, "fresh_token").await;

        let stale = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/helix/users")
                    .query_param("login", "twitchdev")
                    .header("authorization", "Bearer stale_token");
                then.status(401).json_body(json!({
                    "error": "Unauthorized",
                    "status": 401,
                    "message": "Invalid OAuth token"
                }));
            })
            .await;
        let fresh = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/helix/users")
                    .query_param("login", "twitchdev")
                    .header("authorization", "Bearer fresh_token");
                then.status(200).json_body(json!({ "data": [twitchdev()] }));
            })
            .await;

        let helix = helix_at(&server);
        helix
            .token()
            .set_token(AppAccessToken {
                access_token: SecretString::from("stale_token"),
                expires_at: chrono::Utc::now().timestamp() + 3600,
            })
            .await;

        let user = helix.user_by_login(&login()).await.unwrap().unwrap();

        assert_eq!(user.login, "twitchdev");
        stale.assert_hits_async(1).await;
        grant.assert_hits_async(1).await;
        fresh.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_unauthorized_after_renewal_is_returned() {
        let server = MockServer::start_async().await;
        let grant = mock_token(&server, "fresh_token").await;

        let users = server
            .mock_async(|when, then| {
                when.method(GET).path("/helix/users");
                then.status(401)
                    .json_body(json!({ "status": 401, "message": "Invalid OAuth token" }));
            })
            .await;

        let err = helix_at(&server).user_by_login(&login()).await.unwrap_err();

        assert!(
            matches!(err, TwitchError::Api { status: 401, ref message } if message == "Invalid OAuth token")
        );
        users.assert_hits_async(2).await;
        grant.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn test_unknown_login() {
        let server = MockServer::start_async().await;
        mock_token(&server, "fresh_token").await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/helix/users");
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;

        assert!(helix_at(&server).user_by_login(&login()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rate_limited_reads_reset_header() {
        let server = MockServer::start_async().await;
        mock_token(&server, "fresh_token").await;

        let reset_at = chrono::Utc::now().timestamp() + 30;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/helix/streams");
                then.status(429).header("Ratelimit-Reset", reset_at.to_string());
            })
            .await;

        let err = helix_at(&server).streams(20).await.unwrap_err();

        assert!(matches!(err, TwitchError::RateLimited(secs) if (29..=30).contains(&secs)));
    }
}
