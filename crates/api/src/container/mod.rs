//! Dependency container.
//!
//! The object graph is a shaku module, [`TlparserModule`], declaring how
//! every database handle, repository, service and controller is constructed
//! and what it is wired to. [`Container`] builds the module from
//! [`ApiConfig`] and exposes one accessor per provider.
//!
//! # Lifetimes
//!
//! - Components (`http_client`, `mongo`, `elastic`, `twitch_api_token`) are
//!   singletons, built with the module and shared for the life of the process
//! - Providers are factories: each call builds a fresh object graph on top
//!   of the components
//!
//! # Read/write split
//!
//! `*_w_*` providers always sit on the MongoDB repositories. When
//! `READ_BACKEND=elastic` they also mirror every write into Elasticsearch.
//! `*_r_*` providers sit on the repositories selected by `READ_BACKEND`.
//!
//! ```text
//! lamoda_products_w_controller
//! └── lamoda_products_w_service
//!     ├── lamoda_products_mongo_repository ── mongo
//!     ├── lamoda_products_elastic_repository ── elastic   (READ_BACKEND=elastic)
//!     └── http_client
//! twitch_game_r_controller
//! └── twitch_game_r_service
//!     ├── twitch_game_{mongo|elastic}_repository ── {mongo|elastic}
//!     ├── twitch_api_token ── http_client
//!     └── http_client
//! ```

mod components;
mod providers;

pub use components::{HttpClient, MongoDatabaseParameters, ProviderSettings};
pub use providers::{ReadPath, WritePath};

use std::sync::Arc;

use shaku::{HasComponent, HasProvider, module};
use thiserror::Error;

use tlparser_core::StorageBackend;

use crate::config::ApiConfig;
use crate::controllers::{
    LamodaProductsController, TwitchGameController, TwitchStreamController, TwitchUserController,
};
use crate::db::{
    ElasticSearchDatabase, LamodaProductsElasticRepository, LamodaProductsMongoRepository,
    MongoDatabase, RepositoryError, TwitchGameElasticRepository, TwitchGameMongoRepository,
    TwitchStreamElasticRepository, TwitchStreamMongoRepository, TwitchUserElasticRepository,
    TwitchUserMongoRepository,
};
use crate::services::{
    LamodaProductsService, TwitchGameService, TwitchStreamService, TwitchUserService,
};
use crate::twitch::TwitchApiToken;
use providers::{
    GameReadRepository, LamodaProductsRController, LamodaProductsRService,
    LamodaProductsWController, LamodaProductsWService, ProductsReadRepository,
    StreamReadRepository, TwitchGameRController, TwitchGameRService, TwitchGameWController,
    TwitchGameWService, TwitchStreamRController, TwitchStreamRService, TwitchStreamWController,
    TwitchStreamWService, TwitchUserRController, TwitchUserRService, TwitchUserWController,
    TwitchUserWService, UserReadRepository,
};

/// An endpoint module whose handlers resolve controllers from the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WiredModule {
    /// Dotted module name.
    pub name: &'static str,
    /// URL prefix the module is mounted at.
    pub path: &'static str,
}

pub const LAMODA_PRODUCTS_MODULE: WiredModule = WiredModule {
    name: "api.v1.lamoda.products",
    path: "/api/v1/lamoda/products",
};

pub const TWITCH_GAMES_MODULE: WiredModule = WiredModule {
    name: "api.v1.twitch.games",
    path: "/api/v1/twitch/games",
};

pub const TWITCH_USERS_MODULE: WiredModule = WiredModule {
    name: "api.v1.twitch.users",
    path: "/api/v1/twitch/users",
};

pub const TWITCH_STREAMS_MODULE: WiredModule = WiredModule {
    name: "api.v1.twitch.streams",
    path: "/api/v1/twitch/streams",
};

/// Modules the container is wired into.
pub const WIRED_MODULES: [WiredModule; 4] = [
    LAMODA_PRODUCTS_MODULE,
    TWITCH_GAMES_MODULE,
    TWITCH_USERS_MODULE,
    TWITCH_STREAMS_MODULE,
];

// Components are built eagerly, in dependency order, when the module is
// built. Without explicit parameters they point at local services.
module! {
    pub TlparserModule {
        components = [
            HttpClient,
            ProviderSettings,
            MongoDatabase,
            ElasticSearchDatabase,
            TwitchApiToken
        ],
        providers = [
            LamodaProductsMongoRepository,
            TwitchGameMongoRepository,
            TwitchUserMongoRepository,
            TwitchStreamMongoRepository,
            LamodaProductsElasticRepository,
            TwitchGameElasticRepository,
            TwitchUserElasticRepository,
            TwitchStreamElasticRepository,
            ProductsReadRepository,
            GameReadRepository,
            UserReadRepository,
            StreamReadRepository,
            LamodaProductsWService,
            LamodaProductsRService,
            TwitchGameWService,
            TwitchGameRService,
            TwitchUserWService,
            TwitchUserRService,
            TwitchStreamWService,
            TwitchStreamRService,
            LamodaProductsWController,
            LamodaProductsRController,
            TwitchGameWController,
            TwitchGameRController,
            TwitchUserWController,
            TwitchUserRController,
            TwitchStreamWController,
            TwitchStreamRController
        ]
    }
}

/// Errors raised while building the module or running a provider.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// A database handle could not be built from settings.
    #[error("database setup failed: {0}")]
    Database(#[from] RepositoryError),

    /// The shared HTTP client could not be built.
    #[error("http client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// A provider failed to assemble its object.
    #[error("provider failed: {0}")]
    Provider(String),
}

type Result<T> = std::result::Result<T, ContainerError>;

/// The application's dependency container.
///
/// Cheaply cloneable; clones share the same module and therefore the same
/// singletons.
#[derive(Clone)]
pub struct Container {
    config: Arc<ApiConfig>,
    module: Arc<TlparserModule>,
}

impl Container {
    /// Build the module from settings, constructing every singleton.
    ///
    /// No network I/O happens here: database handles and the token holder
    /// connect on first use.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::HttpClient` if the TLS backend fails to
    /// initialize and `ContainerError::Database` if the MongoDB driver
    /// rejects the settings.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let settings = ProviderSettings {
            read_backend: config.read_backend,
            lamoda: config.lamoda.clone(),
            twitch_api_url: config.twitch.api_url.clone(),
        };

        let module = TlparserModule::builder()
            .with_component_parameters::<HttpClient>(HttpClient::build()?)
            .with_component_parameters::<ProviderSettings>(settings)
            .with_component_parameters::<MongoDatabase>(MongoDatabaseParameters {
                database: MongoDatabase::new(&config.mongo)?,
            })
            .with_component_parameters::<ElasticSearchDatabase>(config.elastic.clone())
            .with_component_parameters::<TwitchApiToken>(config.twitch.clone())
            .build();

        tracing::debug!(read_backend = %config.read_backend, "Container module built");

        Ok(Self {
            config: Arc::new(config),
            module: Arc::new(module),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Store behind the `*_r_*` providers.
    #[must_use]
    pub fn read_backend(&self) -> StorageBackend {
        self.config.read_backend
    }

    fn provide<I: ?Sized + 'static>(&self) -> Result<Box<I>>
    where
        TlparserModule: HasProvider<I>,
    {
        HasProvider::<I>::provide(&*self.module)
            .map_err(|e| ContainerError::Provider(e.to_string()))
    }

    fn write_side<T: 'static>(&self) -> Result<T>
    where
        TlparserModule: HasProvider<WritePath<T>>,
    {
        let WritePath(inner) = *self.provide::<WritePath<T>>()?;
        Ok(inner)
    }

    fn read_side<T: 'static>(&self) -> Result<T>
    where
        TlparserModule: HasProvider<ReadPath<T>>,
    {
        let ReadPath(inner) = *self.provide::<ReadPath<T>>()?;
        Ok(inner)
    }

    // =========================================================================
    // Singletons
    // =========================================================================

    /// Shared outbound HTTP client (Lamoda, Helix, Elasticsearch).
    #[must_use]
    pub fn http_client(&self) -> reqwest::Client {
        HasComponent::<HttpClient>::resolve_ref(&*self.module)
            .client()
            .clone()
    }

    #[must_use]
    pub fn mongo(&self) -> Arc<MongoDatabase> {
        HasComponent::<MongoDatabase>::resolve(&*self.module)
    }

    #[must_use]
    pub fn elastic(&self) -> Arc<ElasticSearchDatabase> {
        HasComponent::<ElasticSearchDatabase>::resolve(&*self.module)
    }

    #[must_use]
    pub fn twitch_api_token(&self) -> Arc<TwitchApiToken> {
        HasComponent::<TwitchApiToken>::resolve(&*self.module)
    }

    // =========================================================================
    // Repositories
    // =========================================================================

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if the provider fails.
    pub fn lamoda_products_mongo_repository(&self) -> Result<LamodaProductsMongoRepository> {
        Ok(*self.provide::<LamodaProductsMongoRepository>()?)
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if the provider fails.
    pub fn twitch_game_mongo_repository(&self) -> Result<TwitchGameMongoRepository> {
        Ok(*self.provide::<TwitchGameMongoRepository>()?)
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if the provider fails.
    pub fn twitch_user_mongo_repository(&self) -> Result<TwitchUserMongoRepository> {
        Ok(*self.provide::<TwitchUserMongoRepository>()?)
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if the provider fails.
    pub fn twitch_stream_mongo_repository(&self) -> Result<TwitchStreamMongoRepository> {
        Ok(*self.provide::<TwitchStreamMongoRepository>()?)
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if the provider fails.
    pub fn lamoda_products_elastic_repository(&self) -> Result<LamodaProductsElasticRepository> {
        Ok(*self.provide::<LamodaProductsElasticRepository>()?)
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if the provider fails.
    pub fn twitch_game_elastic_repository(&self) -> Result<TwitchGameElasticRepository> {
        Ok(*self.provide::<TwitchGameElasticRepository>()?)
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if the provider fails.
    pub fn twitch_user_elastic_repository(&self) -> Result<TwitchUserElasticRepository> {
        Ok(*self.provide::<TwitchUserElasticRepository>()?)
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if the provider fails.
    pub fn twitch_stream_elastic_repository(&self) -> Result<TwitchStreamElasticRepository> {
        Ok(*self.provide::<TwitchStreamElasticRepository>()?)
    }

    // =========================================================================
    // Services
    // =========================================================================

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if a provider it depends on fails.
    pub fn lamoda_products_w_service(&self) -> Result<LamodaProductsService> {
        self.write_side()
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if a provider it depends on fails.
    pub fn lamoda_products_r_service(&self) -> Result<LamodaProductsService> {
        self.read_side()
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if a provider it depends on fails.
    pub fn twitch_game_w_service(&self) -> Result<TwitchGameService> {
        self.write_side()
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if a provider it depends on fails.
    pub fn twitch_game_r_service(&self) -> Result<TwitchGameService> {
        self.read_side()
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if a provider it depends on fails.
    pub fn twitch_user_w_service(&self) -> Result<TwitchUserService> {
        self.write_side()
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if a provider it depends on fails.
    pub fn twitch_user_r_service(&self) -> Result<TwitchUserService> {
        self.read_side()
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if a provider it depends on fails.
    pub fn twitch_stream_w_service(&self) -> Result<TwitchStreamService> {
        self.write_side()
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if a provider it depends on fails.
    pub fn twitch_stream_r_service(&self) -> Result<TwitchStreamService> {
        self.read_side()
    }

    // =========================================================================
    // Controllers
    // =========================================================================

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if a provider it depends on fails.
    pub fn lamoda_products_w_controller(&self) -> Result<LamodaProductsController> {
        self.write_side()
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if a provider it depends on fails.
    pub fn lamoda_products_r_controller(&self) -> Result<LamodaProductsController> {
        self.read_side()
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if a provider it depends on fails.
    pub fn twitch_game_w_controller(&self) -> Result<TwitchGameController> {
        self.write_side()
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if a provider it depends on fails.
    pub fn twitch_game_r_controller(&self) -> Result<TwitchGameController> {
        self.read_side()
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if a provider it depends on fails.
    pub fn twitch_user_w_controller(&self) -> Result<TwitchUserController> {
        self.write_side()
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if a provider it depends on fails.
    pub fn twitch_user_r_controller(&self) -> Result<TwitchUserController> {
        self.read_side()
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if a provider it depends on fails.
    pub fn twitch_stream_w_controller(&self) -> Result<TwitchStreamController> {
        self.write_side()
    }

    /// # Errors
    ///
    /// Returns `ContainerError::Provider` if a provider it depends on fails.
    pub fn twitch_stream_r_controller(&self) -> Result<TwitchStreamController> {
        self.read_side()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;

    fn container(read_backend: StorageBackend) -> Container {
        Container::new(test_config(read_backend)).unwrap()
    }

    fn same<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
        Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
    }

    #[test]
    fn test_wired_modules() {
        let names: Vec<&str> = WIRED_MODULES.iter().map(|m| m.name).collect();
        assert_eq!(
            names,
            [
                "api.v1.lamoda.products",
                "api.v1.twitch.games",
                "api.v1.twitch.users",
                "api.v1.twitch.streams",
            ]
        );

        for module in WIRED_MODULES {
            assert_eq!(module.path, format!("/{}", module.name.replace('.', "/")));
        }
    }

    #[tokio::test]
    async fn test_module_builds_with_default_parameters() {
        let module = TlparserModule::builder().build();

        let settings: &ProviderSettings = module.resolve_ref();
        assert_eq!(settings.read_backend, StorageBackend::Mongo);

        let es: &ElasticSearchDatabase = module.resolve_ref();
        assert_eq!(es.base_url().as_str(), "http://localhost:9200/");

        let service = HasProvider::<ReadPath<LamodaProductsService>>::provide(&module).unwrap();
        assert_eq!(service.0.repository().backend(), StorageBackend::Mongo);
    }

    #[tokio::test]
    async fn test_every_provider_resolves() {
        for backend in [StorageBackend::Mongo, StorageBackend::Elastic] {
            let c = container(backend);

            c.lamoda_products_mongo_repository().unwrap();
            c.twitch_game_mongo_repository().unwrap();
            c.twitch_user_mongo_repository().unwrap();
            c.twitch_stream_mongo_repository().unwrap();
            c.lamoda_products_elastic_repository().unwrap();
            c.twitch_game_elastic_repository().unwrap();
            c.twitch_user_elastic_repository().unwrap();
            c.twitch_stream_elastic_repository().unwrap();

            c.lamoda_products_w_service().unwrap();
            c.lamoda_products_r_service().unwrap();
            c.twitch_game_w_service().unwrap();
            c.twitch_game_r_service().unwrap();
            c.twitch_user_w_service().unwrap();
            c.twitch_user_r_service().unwrap();
            c.twitch_stream_w_service().unwrap();
            c.twitch_stream_r_service().unwrap();

            c.lamoda_products_w_controller().unwrap();
            c.lamoda_products_r_controller().unwrap();
            c.twitch_game_w_controller().unwrap();
            c.twitch_game_r_controller().unwrap();
            c.twitch_user_w_controller().unwrap();
            c.twitch_user_r_controller().unwrap();
            c.twitch_stream_w_controller().unwrap();
            c.twitch_stream_r_controller().unwrap();
        }
    }

    #[tokio::test]
    async fn test_write_services_hold_mongo_repositories() {
        // Even when reads go to Elasticsearch
        let c = container(StorageBackend::Elastic);

        let products = c.lamoda_products_w_service().unwrap();
        assert_eq!(products.repository().backend(), StorageBackend::Mongo);

        assert_eq!(
            c.twitch_game_w_service().unwrap().repository().backend(),
            StorageBackend::Mongo
        );
        assert_eq!(
            c.twitch_user_w_service().unwrap().repository().backend(),
            StorageBackend::Mongo
        );
        assert_eq!(
            c.twitch_stream_w_service().unwrap().repository().backend(),
            StorageBackend::Mongo
        );
    }

    #[tokio::test]
    async fn test_write_services_mirror_into_elastic_read_store() {
        let c = container(StorageBackend::Elastic);

        let elastic = Some(StorageBackend::Elastic);
        let products = c.lamoda_products_w_service().unwrap();
        assert_eq!(products.mirror().map(|m| m.backend()), elastic);
        let games = c.twitch_game_w_service().unwrap();
        assert_eq!(games.mirror().map(|m| m.backend()), elastic);
        let users = c.twitch_user_w_service().unwrap();
        assert_eq!(users.mirror().map(|m| m.backend()), elastic);
        let streams = c.twitch_stream_w_service().unwrap();
        assert_eq!(streams.mirror().map(|m| m.backend()), elastic);

        // Reads never write, so they carry no mirror
        assert!(c.lamoda_products_r_service().unwrap().mirror().is_none());
    }

    #[tokio::test]
    async fn test_write_services_without_elastic_reads_have_no_mirror() {
        let c = container(StorageBackend::Mongo);

        assert!(c.lamoda_products_w_service().unwrap().mirror().is_none());
        assert!(c.twitch_game_w_service().unwrap().mirror().is_none());
        assert!(c.twitch_user_w_service().unwrap().mirror().is_none());
        assert!(c.twitch_stream_w_service().unwrap().mirror().is_none());
    }

    #[tokio::test]
    async fn test_read_services_follow_read_backend() {
        for backend in [StorageBackend::Mongo, StorageBackend::Elastic] {
            let c = container(backend);

            assert_eq!(
                c.lamoda_products_r_service().unwrap().repository().backend(),
                backend
            );
            assert_eq!(c.twitch_game_r_service().unwrap().repository().backend(), backend);
            assert_eq!(c.twitch_user_r_service().unwrap().repository().backend(), backend);
            assert_eq!(c.twitch_stream_r_service().unwrap().repository().backend(), backend);
        }
    }

    #[tokio::test]
    async fn test_controllers_wrap_matching_service() {
        let c = container(StorageBackend::Elastic);

        let w = c.lamoda_products_w_controller().unwrap();
        let r = c.lamoda_products_r_controller().unwrap();
        assert_eq!(w.service().repository().backend(), StorageBackend::Mongo);
        assert_eq!(r.service().repository().backend(), StorageBackend::Elastic);

        let w = c.twitch_user_w_controller().unwrap();
        let r = c.twitch_user_r_controller().unwrap();
        assert_eq!(w.service().repository().backend(), StorageBackend::Mongo);
        assert_eq!(r.service().repository().backend(), StorageBackend::Elastic);
    }

    #[tokio::test]
    async fn test_singletons_are_shared() {
        let c = container(StorageBackend::Mongo);

        assert!(same(&c.mongo(), &c.mongo()));
        assert!(same(&c.elastic(), &c.elastic()));
        assert!(same(&c.twitch_api_token(), &c.twitch_api_token()));

        // Clones of the container share singletons too
        let clone = c.clone();
        assert!(same(&c.mongo(), &clone.mongo()));
        assert!(same(&c.twitch_api_token(), &clone.twitch_api_token()));
    }

    #[tokio::test]
    async fn test_separate_containers_do_not_share_singletons() {
        let a = container(StorageBackend::Mongo);
        let b = container(StorageBackend::Mongo);

        assert!(!same(&a.mongo(), &b.mongo()));
        assert!(!same(&a.twitch_api_token(), &b.twitch_api_token()));
    }

    #[tokio::test]
    async fn test_factories_share_singletons() {
        let c = container(StorageBackend::Mongo);
        let mongo = c.mongo();

        let a = c.lamoda_products_mongo_repository().unwrap();
        let b = c.twitch_user_mongo_repository().unwrap();
        assert!(same(a.database(), &mongo));
        assert!(same(b.database(), &mongo));

        let es = c.elastic();
        assert!(same(c.twitch_game_elastic_repository().unwrap().database(), &es));

        let token = c.twitch_api_token();
        let games = c.twitch_game_w_service().unwrap();
        let streams = c.twitch_stream_r_service().unwrap();
        assert!(same(games.helix().token(), &token));
        assert!(same(streams.helix().token(), &token));
    }

    #[tokio::test]
    async fn test_factories_are_fresh() {
        let c = container(StorageBackend::Mongo);

        let first = c.lamoda_products_w_service().unwrap();
        let second = c.lamoda_products_w_service().unwrap();
        assert!(!same(first.repository(), second.repository()));

        let first = c.twitch_user_r_controller().unwrap();
        let second = c.twitch_user_r_controller().unwrap();
        assert!(!same(first.service().repository(), second.service().repository()));
    }

    #[tokio::test]
    async fn test_components_carry_config() {
        let c = container(StorageBackend::Elastic);

        assert_eq!(c.elastic().base_url().as_str(), "http://localhost:9200/");
        assert_eq!(c.twitch_api_token().client_id(), "client_id_value");
        assert_eq!(c.mongo().name(), "tlparser_test");

        let settings: &ProviderSettings = c.module.resolve_ref();
        assert_eq!(settings.read_backend, StorageBackend::Elastic);
    }
}
