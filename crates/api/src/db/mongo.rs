//! MongoDB connection.

use std::time::Duration;

use mongodb::bson::doc;
use mongodb::options::{ClientOptions, Credential, IndexOptions, ServerAddress};
use mongodb::{Client, Collection, Database, IndexModel};
use secrecy::ExposeSecret;
use tracing::instrument;

use super::{LAMODA_PRODUCTS, RepositoryError, TWITCH_GAMES, TWITCH_STREAMS, TWITCH_USERS};
use crate::config::MongoConfig;

/// Handle to the application's MongoDB database.
///
/// Cheap to clone: the driver handle is reference counted internally and
/// pools its own connections. Connections are opened lazily on first use,
/// so construction never touches the network.
#[derive(Clone, Debug)]
pub struct MongoDatabase {
    database: Database,
}

impl MongoDatabase {
    /// Build a database handle from settings.
    ///
    /// Authenticates with SCRAM against `auth_source`. An empty username
    /// connects without credentials.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Mongo` if the driver rejects the options.
    pub fn new(config: &MongoConfig) -> Result<Self, RepositoryError> {
        let credential = (!config.username.is_empty()).then(|| {
            let mut credential = Credential::default();
            credential.username = Some(config.username.clone());
            credential.password = Some(config.password.expose_secret().to_owned());
            credential.source = Some(config.auth_source.clone());
            credential
        });

        let mut options = ClientOptions::default();
        options.hosts = vec![ServerAddress::Tcp {
            host: config.host.clone(),
            port: Some(config.port),
        }];
        options.credential = credential;
        options.app_name = Some("tlparser".to_owned());
        options.connect_timeout = Some(Duration::from_secs(10));
        options.server_selection_timeout = Some(Duration::from_secs(10));

        let client = Client::with_options(options)?;
        let database = client.database(&config.db_name);

        tracing::debug!(
            host = %config.host,
            port = config.port,
            db = %config.db_name,
            "MongoDB client created"
        );

        Ok(Self { database })
    }

    /// Name of the underlying database.
    #[must_use]
    pub fn name(&self) -> &str {
        self.database.name()
    }

    /// Get a typed collection.
    #[must_use]
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.database.collection(name)
    }

    /// Verify the server is reachable and the credentials are accepted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Mongo` if the ping command fails.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// Create the unique indexes every repository relies on for upserts.
    ///
    /// Idempotent: MongoDB ignores index creation when an identical index
    /// already exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Mongo` if any index cannot be created.
    #[instrument(skip(self), fields(db = %self.name()))]
    pub async fn ensure_indexes(&self) -> Result<(), RepositoryError> {
        let unique_keys = [
            (LAMODA_PRODUCTS, "sku"),
            (TWITCH_GAMES, "id"),
            (TWITCH_USERS, "login"),
            (TWITCH_STREAMS, "id"),
        ];

        for (collection, key) in unique_keys {
            let index = IndexModel::builder()
                .keys(doc! { key: 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build();

            self.collection::<mongodb::bson::Document>(collection)
                .create_index(index)
                .await?;

            tracing::info!(collection, key, "Unique index ensured");
        }

        // Products are listed and deleted per category
        self.collection::<mongodb::bson::Document>(LAMODA_PRODUCTS)
            .create_index(IndexModel::builder().keys(doc! { "category": 1 }).build())
            .await?;

        Ok(())
    }
}
