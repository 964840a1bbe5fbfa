//! Helix payloads and their conversion into stored entities.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use tlparser_core::{
    BroadcasterType, GameId, StreamId, TwitchGame, TwitchStream, TwitchUser, TwitchUserId,
    UserType,
};

/// Game object from `helix/games/top`.
#[derive(Debug, Deserialize)]
pub struct HelixGame {
    pub id: String,
    pub name: String,
    pub box_art_url: String,
    #[serde(default)]
    pub igdb_id: String,
}

/// User object from `helix/users`.
#[derive(Debug, Deserialize)]
pub struct HelixUser {
    pub id: String,
    pub login: String,
    pub display_name: String,
    #[serde(default, rename = "type")]
    pub user_type: String,
    #[serde(default)]
    pub broadcaster_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub offline_image_url: String,
    pub created_at: DateTime<Utc>,
}

/// Stream object from `helix/streams`.
#[derive(Debug, Deserialize)]
pub struct HelixStream {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub game_id: String,
    pub game_name: String,
    #[serde(default, rename = "type")]
    pub stream_type: String,
    pub title: String,
    pub language: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub viewer_count: u64,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub is_mature: bool,
}

pub fn convert_game(game: HelixGame, parsed_at: DateTime<Utc>) -> TwitchGame {
    TwitchGame {
        id: GameId::new(game.id),
        name: game.name,
        box_art_url: game.box_art_url,
        igdb_id: Some(game.igdb_id).filter(|id| !id.is_empty()),
        parsed_at,
    }
}

pub fn convert_user(user: HelixUser, parsed_at: DateTime<Utc>) -> TwitchUser {
    TwitchUser {
        id: TwitchUserId::new(user.id),
        login: user.login,
        display_name: user.display_name,
        user_type: UserType::from_helix(&user.user_type),
        broadcaster_type: BroadcasterType::from_helix(&user.broadcaster_type),
        description: user.description,
        profile_image_url: user.profile_image_url,
        offline_image_url: user.offline_image_url,
        created_at: user.created_at,
        parsed_at,
    }
}

pub fn convert_stream(stream: HelixStream, parsed_at: DateTime<Utc>) -> TwitchStream {
    TwitchStream {
        id: StreamId::new(stream.id),
        user_id: TwitchUserId::new(stream.user_id),
        user_login: stream.user_login,
        user_name: stream.user_name,
        game_id: GameId::new(stream.game_id),
        game_name: stream.game_name,
        stream_type: stream.stream_type,
        title: stream.title,
        language: stream.language,
        tags: stream.tags.unwrap_or_default(),
        viewer_count: stream.viewer_count,
        started_at: stream.started_at,
        is_mature: stream.is_mature,
        parsed_at,
    }
}
