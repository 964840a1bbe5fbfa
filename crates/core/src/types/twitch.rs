//! Twitch entities as stored by tlparser.
//!
//! These mirror the Helix API objects closely but are owned by us: the
//! API crate converts Helix responses into them and stamps `parsed_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{GameId, StreamId, TwitchUserId};

/// A game (category) listed on Twitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitchGame {
    pub id: GameId,
    pub name: String,
    /// Box art URL template containing `{width}x{height}` placeholders.
    pub box_art_url: String,
    #[serde(default)]
    pub igdb_id: Option<String>,
    pub parsed_at: DateTime<Utc>,
}

/// Account type of a Twitch user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Admin,
    GlobalMod,
    Staff,
    #[default]
    Normal,
}

impl UserType {
    /// Map the Helix `type` field, where an empty string means a normal user.
    #[must_use]
    pub fn from_helix(value: &str) -> Self {
        match value {
            "admin" => Self::Admin,
            "global_mod" => Self::GlobalMod,
            "staff" => Self::Staff,
            _ => Self::Normal,
        }
    }
}

/// Broadcaster program a Twitch user belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BroadcasterType {
    Partner,
    Affiliate,
    #[default]
    Normal,
}

impl BroadcasterType {
    /// Map the Helix `broadcaster_type` field, where an empty string means a normal broadcaster.
    #[must_use]
    pub fn from_helix(value: &str) -> Self {
        match value {
            "partner" => Self::Partner,
            "affiliate" => Self::Affiliate,
            _ => Self::Normal,
        }
    }
}

/// A Twitch user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitchUser {
    pub id: TwitchUserId,
    /// Lowercase login name, used as the natural key.
    pub login: String,
    pub display_name: String,
    #[serde(default)]
    pub user_type: UserType,
    #[serde(default)]
    pub broadcaster_type: BroadcasterType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub offline_image_url: String,
    /// When the account was created on Twitch.
    pub created_at: DateTime<Utc>,
    pub parsed_at: DateTime<Utc>,
}

/// A live stream snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitchStream {
    pub id: StreamId,
    pub user_id: TwitchUserId,
    pub user_login: String,
    pub user_name: String,
    pub game_id: GameId,
    pub game_name: String,
    /// `live`, or empty on error per the Helix docs.
    #[serde(default)]
    pub stream_type: String,
    pub title: String,
    pub language: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub viewer_count: u64,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub is_mature: bool,
    pub parsed_at: DateTime<Utc>,
}
