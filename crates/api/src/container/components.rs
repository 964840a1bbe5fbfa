//! Singleton components.
//!
//! Built once when the module is built and shared by every provider. Each
//! takes its settings as component parameters; defaults point at local
//! services.

use std::time::Duration;

use shaku::{Component, HasComponent, Module, ModuleBuildContext};
use url::Url;

use tlparser_core::StorageBackend;

use crate::config::{ElasticConfig, LamodaConfig, MongoConfig, TwitchConfig};
use crate::db::{ElasticSearchDatabase, MongoDatabase};
use crate::twitch::TwitchApiToken;

/// Timeout for every outbound HTTP request.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// HTTP client
// =============================================================================

/// Shared outbound HTTP client (Lamoda, Helix, Elasticsearch).
///
/// Passed to the module as its own parameters; the default is a client
/// without the user agent and timeout.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Build the client every outbound request goes through.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the TLS backend fails to initialize.
    pub fn build() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tlparser/", env!("CARGO_PKG_VERSION")))
            .timeout(HTTP_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }

    #[must_use]
    pub const fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl<M: Module> Component<M> for HttpClient {
    type Interface = Self;
    type Parameters = Self;

    fn build(_: &mut ModuleBuildContext<M>, params: Self) -> Box<Self> {
        Box::new(params)
    }
}

// =============================================================================
// Provider settings
// =============================================================================

/// Settings the factories read when they assemble a graph.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Store behind the read-side providers.
    pub read_backend: StorageBackend,
    pub lamoda: LamodaConfig,
    pub twitch_api_url: Url,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            read_backend: StorageBackend::default(),
            lamoda: LamodaConfig::default(),
            twitch_api_url: TwitchConfig::default().api_url,
        }
    }
}

impl<M: Module> Component<M> for ProviderSettings {
    type Interface = Self;
    type Parameters = Self;

    fn build(_: &mut ModuleBuildContext<M>, params: Self) -> Box<Self> {
        Box::new(params)
    }
}

// =============================================================================
// Stores
// =============================================================================

pub struct MongoDatabaseParameters {
    pub database: MongoDatabase,
}

impl Default for MongoDatabaseParameters {
    /// Unauthenticated handle to `localhost:27017`.
    ///
    /// # Panics
    ///
    /// Panics if the driver rejects the default options.
    fn default() -> Self {
        Self {
            database: MongoDatabase::new(&MongoConfig::default())
                .expect("Invalid default MongoDB settings"),
        }
    }
}

impl<M: Module> Component<M> for MongoDatabase {
    type Interface = Self;
    type Parameters = MongoDatabaseParameters;

    fn build(_: &mut ModuleBuildContext<M>, params: Self::Parameters) -> Box<Self> {
        Box::new(params.database)
    }
}

impl<M: Module + HasComponent<HttpClient>> Component<M> for ElasticSearchDatabase {
    type Interface = Self;
    type Parameters = ElasticConfig;

    fn build(context: &mut ModuleBuildContext<M>, config: ElasticConfig) -> Box<Self> {
        let http = <M as HasComponent<HttpClient>>::build_component(context);
        Box::new(Self::new(http.client().clone(), &config))
    }
}

// =============================================================================
// Twitch
// =============================================================================

impl<M: Module + HasComponent<HttpClient>> Component<M> for TwitchApiToken {
    type Interface = Self;
    type Parameters = TwitchConfig;

    fn build(context: &mut ModuleBuildContext<M>, config: TwitchConfig) -> Box<Self> {
        let http = <M as HasComponent<HttpClient>>::build_component(context);
        Box::new(Self::new(http.client().clone(), &config))
    }
}
