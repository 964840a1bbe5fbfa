//! Core types for tlparser.
//!
//! This module provides the entities of both data domains and type-safe
//! wrappers for the values they are keyed by.

pub mod backend;
pub mod id;
pub mod lamoda;
pub mod price;
pub mod slug;
pub mod twitch;

pub use backend::{StorageBackend, UnknownBackend};
pub use id::*;
pub use lamoda::LamodaProduct;
pub use price::{CurrencyCode, Price};
pub use slug::{Category, SlugError, TwitchLogin};
pub use twitch::{BroadcasterType, TwitchGame, TwitchStream, TwitchUser, UserType};
