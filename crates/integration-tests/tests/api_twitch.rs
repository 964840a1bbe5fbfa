//! Integration tests for the Twitch endpoints.
//!
//! These tests require:
//! - The API server running (cargo run -p tlparser-api)
//! - MongoDB reachable by the server
//! - Valid `TWITCH_CLIENT_ID` / `TWITCH_CLIENT_SECRET` configured on the server
//!
//! Run with: cargo test -p tlparser-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::Value;
use tlparser_core::{TwitchGame, TwitchStream, TwitchUser};
use tlparser_integration_tests::{api_base_url, client, expect_json};

#[tokio::test]
#[ignore = "Requires running API server, MongoDB and Twitch credentials"]
async fn test_parse_and_list_games() {
    let client = client();
    let base_url = format!("{}/api/v1/twitch/games", api_base_url());

    let resp = client.post(&base_url).send().await.expect("Failed to parse games");
    let parsed: Value = expect_json(resp, StatusCode::OK).await;
    assert!(parsed["parsed"].as_u64().expect("parsed count") > 0);

    let resp = client.get(&base_url).send().await.expect("Failed to list games");
    let games: Vec<TwitchGame> = expect_json(resp, StatusCode::OK).await;
    assert!(!games.is_empty());
}

#[tokio::test]
#[ignore = "Requires running API server, MongoDB and Twitch credentials"]
async fn test_user_lifecycle() {
    let client = client();
    let url = format!("{}/api/v1/twitch/users/twitchdev", api_base_url());

    let resp = client.post(&url).send().await.expect("Failed to parse user");
    let user: TwitchUser = expect_json(resp, StatusCode::OK).await;
    assert_eq!(user.login, "twitchdev");

    let resp = client.get(&url).send().await.expect("Failed to get user");
    let stored: TwitchUser = expect_json(resp, StatusCode::OK).await;
    assert_eq!(stored.id, user.id);

    let resp = client.delete(&url).send().await.expect("Failed to delete user");
    let deleted: Value = expect_json(resp, StatusCode::OK).await;
    assert_eq!(deleted["deleted"], 1);

    let resp = client.get(&url).send().await.expect("Failed to get user");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server, MongoDB and Twitch credentials"]
async fn test_unknown_user_is_not_found() {
    let resp = client()
        .post(format!(
            "{}/api/v1/twitch/users/zz_no_such_login_0000",
            api_base_url()
        ))
        .send()
        .await
        .expect("Failed to call API");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server, MongoDB and Twitch credentials"]
async fn test_streams_sorted_by_viewers() {
    let client = client();
    let base_url = format!("{}/api/v1/twitch/streams", api_base_url());

    let resp = client.post(&base_url).send().await.expect("Failed to parse streams");
    let _: Value = expect_json(resp, StatusCode::OK).await;

    let resp = client.get(&base_url).send().await.expect("Failed to list streams");
    let streams: Vec<TwitchStream> = expect_json(resp, StatusCode::OK).await;
    assert!(
        streams
            .windows(2)
            .all(|w| w.first().map(|s| s.viewer_count) >= w.get(1).map(|s| s.viewer_count))
    );
}
