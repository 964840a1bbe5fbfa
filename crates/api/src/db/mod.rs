//! Database connections.
//!
//! # Stores
//!
//! - MongoDB (`mongo`) - system of record, every write path lands here
//! - Elasticsearch (`elastic`) - search store for read paths
//!
//! Every entity has a repository trait with one implementation per store
//! (`products`, `games`, `users`, `streams`). Both stores hold one
//! collection/index per entity type:
//!
//! - `lamoda_products` - keyed by `sku`
//! - `twitch_games` - keyed by `id`
//! - `twitch_users` - keyed by `login`
//! - `twitch_streams` - keyed by `id`
//!
//! # Setup
//!
//! Indexes and indices are created via:
//! ```bash
//! cargo run -p tlparser-cli -- setup all
//! ```

pub mod elastic;
pub mod games;
pub mod mongo;
pub mod products;
pub mod streams;
pub mod users;

use thiserror::Error;

pub use elastic::ElasticSearchDatabase;
pub use games::{GameRepository, TwitchGameElasticRepository, TwitchGameMongoRepository};
pub use mongo::MongoDatabase;
pub use products::{
    LamodaProductsElasticRepository, LamodaProductsMongoRepository, ProductsRepository,
};
pub use streams::{StreamRepository, TwitchStreamElasticRepository, TwitchStreamMongoRepository};
pub use users::{TwitchUserElasticRepository, TwitchUserMongoRepository, UserRepository};

/// Collection / index holding Lamoda products.
pub const LAMODA_PRODUCTS: &str = "lamoda_products";
/// Collection / index holding Twitch games.
pub const TWITCH_GAMES: &str = "twitch_games";
/// Collection / index holding Twitch users.
pub const TWITCH_USERS: &str = "twitch_users";
/// Collection / index holding Twitch streams.
pub const TWITCH_STREAMS: &str = "twitch_streams";

/// Every collection / index the application uses.
pub const ALL_COLLECTIONS: [&str; 4] = [LAMODA_PRODUCTS, TWITCH_GAMES, TWITCH_USERS, TWITCH_STREAMS];

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Error from the MongoDB driver.
    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// Transport error talking to Elasticsearch.
    #[error("elasticsearch request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Elasticsearch answered with a non-success status.
    #[error("elasticsearch returned {status}: {message}")]
    Elastic { status: u16, message: String },

    /// An Elasticsearch path could not be joined onto the base URL.
    #[error("invalid elasticsearch url: {0}")]
    Url(#[from] url::ParseError),

    /// A document could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Data in the store is corrupted or has an unexpected shape.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}
