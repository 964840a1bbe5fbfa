//! Factory providers.
//!
//! Every call assembles a fresh object on top of the singleton components.
//! Write-side and read-side instances of the same service type are told
//! apart by their interface: [`WritePath`] or [`ReadPath`].

use std::error::Error;
use std::sync::Arc;

use shaku::{HasComponent, HasProvider, Module, Provider};

use tlparser_core::StorageBackend;

use super::components::{HttpClient, ProviderSettings};
use crate::controllers::{
    LamodaProductsController, TwitchGameController, TwitchStreamController, TwitchUserController,
};
use crate::db::{
    ElasticSearchDatabase, GameRepository, LamodaProductsElasticRepository,
    LamodaProductsMongoRepository, MongoDatabase, ProductsRepository, StreamRepository,
    TwitchGameElasticRepository, TwitchGameMongoRepository, TwitchStreamElasticRepository,
    TwitchStreamMongoRepository, TwitchUserElasticRepository, TwitchUserMongoRepository,
    UserRepository,
};
use crate::lamoda::LamodaClient;
use crate::services::{
    LamodaProductsService, TwitchGameService, TwitchStreamService, TwitchUserService,
};
use crate::twitch::{HelixClient, TwitchApiToken};

/// A service or controller on the write side: MongoDB, mirrored into
/// Elasticsearch when reads are served from there.
pub struct WritePath<T>(pub T);

/// A service or controller on the read side: the store `READ_BACKEND` selects.
pub struct ReadPath<T>(pub T);

fn read_backend<M: Module + HasComponent<ProviderSettings>>(module: &M) -> StorageBackend {
    HasComponent::<ProviderSettings>::resolve_ref(module).read_backend
}

fn lamoda_client<M>(module: &M) -> LamodaClient
where
    M: Module + HasComponent<HttpClient> + HasComponent<ProviderSettings>,
{
    let http = HasComponent::<HttpClient>::resolve_ref(module);
    let settings = HasComponent::<ProviderSettings>::resolve_ref(module);
    LamodaClient::new(http.client().clone(), &settings.lamoda)
}

fn helix_client<M>(module: &M) -> HelixClient
where
    M: Module
        + HasComponent<HttpClient>
        + HasComponent<ProviderSettings>
        + HasComponent<TwitchApiToken>,
{
    let http = HasComponent::<HttpClient>::resolve_ref(module);
    let settings = HasComponent::<ProviderSettings>::resolve_ref(module);
    HelixClient::new(
        http.client().clone(),
        HasComponent::<TwitchApiToken>::resolve(module),
        settings.twitch_api_url.clone(),
    )
}

// =============================================================================
// Repositories
// =============================================================================

macro_rules! repository_provider {
    ($repository:ty => $store:ty) => {
        impl<M: Module + HasComponent<$store>> Provider<M> for $repository {
            type Interface = Self;

            fn provide(module: &M) -> Result<Box<Self>, Box<dyn Error>> {
                Ok(Box::new(Self::new(HasComponent::<$store>::resolve(module))))
            }
        }
    };
}

repository_provider!(LamodaProductsMongoRepository => MongoDatabase);
repository_provider!(TwitchGameMongoRepository => MongoDatabase);
repository_provider!(TwitchUserMongoRepository => MongoDatabase);
repository_provider!(TwitchStreamMongoRepository => MongoDatabase);
repository_provider!(LamodaProductsElasticRepository => ElasticSearchDatabase);
repository_provider!(TwitchGameElasticRepository => ElasticSearchDatabase);
repository_provider!(TwitchUserElasticRepository => ElasticSearchDatabase);
repository_provider!(TwitchStreamElasticRepository => ElasticSearchDatabase);

macro_rules! read_repository_provider {
    ($name:ident: dyn $repository:ident = $mongo:ty | $elastic:ty) => {
        #[doc = concat!("`dyn ", stringify!($repository), "` on the store `READ_BACKEND` selects.")]
        pub struct $name;

        impl<M> Provider<M> for $name
        where
            M: Module
                + HasComponent<ProviderSettings>
                + HasProvider<$mongo>
                + HasProvider<$elastic>,
        {
            type Interface = dyn $repository;

            fn provide(module: &M) -> Result<Box<dyn $repository>, Box<dyn Error>> {
                let repository: Box<dyn $repository> = match read_backend(module) {
                    StorageBackend::Mongo => HasProvider::<$mongo>::provide(module)?,
                    StorageBackend::Elastic => HasProvider::<$elastic>::provide(module)?,
                };
                Ok(repository)
            }
        }
    };
}

read_repository_provider!(ProductsReadRepository: dyn ProductsRepository =
    LamodaProductsMongoRepository | LamodaProductsElasticRepository);
read_repository_provider!(GameReadRepository: dyn GameRepository =
    TwitchGameMongoRepository | TwitchGameElasticRepository);
read_repository_provider!(UserReadRepository: dyn UserRepository =
    TwitchUserMongoRepository | TwitchUserElasticRepository);
read_repository_provider!(StreamReadRepository: dyn StreamRepository =
    TwitchStreamMongoRepository | TwitchStreamElasticRepository);

// =============================================================================
// Services
// =============================================================================

macro_rules! service_providers {
    ($service:ident via $client:ident {
        write: $write:ident => $mongo:ty, mirror $elastic:ty;
        read: $read:ident => dyn $repository:ident;
    }) => {
        #[doc = concat!("Write-side [`", stringify!($service), "`].")]
        pub struct $write;

        impl<M> Provider<M> for $write
        where
            M: Module
                + HasComponent<HttpClient>
                + HasComponent<ProviderSettings>
                + HasComponent<TwitchApiToken>
                + HasProvider<$mongo>
                + HasProvider<$elastic>,
        {
            type Interface = WritePath<$service>;

            fn provide(module: &M) -> Result<Box<Self::Interface>, Box<dyn Error>> {
                let repository: Arc<$mongo> = Arc::from(HasProvider::<$mongo>::provide(module)?);
                let mut service = $service::new(repository, $client(module));

                if read_backend(module) == StorageBackend::Elastic {
                    let mirror: Arc<$elastic> = Arc::from(HasProvider::<$elastic>::provide(module)?);
                    service = service.with_mirror(mirror);
                }

                Ok(Box::new(WritePath(service)))
            }
        }

        #[doc = concat!("Read-side [`", stringify!($service), "`].")]
        pub struct $read;

        impl<M> Provider<M> for $read
        where
            M: Module
                + HasComponent<HttpClient>
                + HasComponent<ProviderSettings>
                + HasComponent<TwitchApiToken>
                + HasProvider<dyn $repository>,
        {
            type Interface = ReadPath<$service>;

            fn provide(module: &M) -> Result<Box<Self::Interface>, Box<dyn Error>> {
                let repository: Arc<dyn $repository> =
                    Arc::from(HasProvider::<dyn $repository>::provide(module)?);
                Ok(Box::new(ReadPath($service::new(repository, $client(module)))))
            }
        }
    };
}

service_providers!(LamodaProductsService via lamoda_client {
    write: LamodaProductsWService => LamodaProductsMongoRepository, mirror LamodaProductsElasticRepository;
    read: LamodaProductsRService => dyn ProductsRepository;
});

service_providers!(TwitchGameService via helix_client {
    write: TwitchGameWService => TwitchGameMongoRepository, mirror TwitchGameElasticRepository;
    read: TwitchGameRService => dyn GameRepository;
});

service_providers!(TwitchUserService via helix_client {
    write: TwitchUserWService => TwitchUserMongoRepository, mirror TwitchUserElasticRepository;
    read: TwitchUserRService => dyn UserRepository;
});

service_providers!(TwitchStreamService via helix_client {
    write: TwitchStreamWService => TwitchStreamMongoRepository, mirror TwitchStreamElasticRepository;
    read: TwitchStreamRService => dyn StreamRepository;
});

// =============================================================================
// Controllers
// =============================================================================

macro_rules! controller_providers {
    ($controller:ident over $service:ident {
        write: $write:ident;
        read: $read:ident;
    }) => {
        #[doc = concat!("Write-side [`", stringify!($controller), "`].")]
        pub struct $write;

        impl<M: Module + HasProvider<WritePath<$service>>> Provider<M> for $write {
            type Interface = WritePath<$controller>;

            fn provide(module: &M) -> Result<Box<Self::Interface>, Box<dyn Error>> {
                let WritePath(service) = *HasProvider::<WritePath<$service>>::provide(module)?;
                Ok(Box::new(WritePath($controller::new(service))))
            }
        }

        #[doc = concat!("Read-side [`", stringify!($controller), "`].")]
        pub struct $read;

        impl<M: Module + HasProvider<ReadPath<$service>>> Provider<M> for $read {
            type Interface = ReadPath<$controller>;

            fn provide(module: &M) -> Result<Box<Self::Interface>, Box<dyn Error>> {
                let ReadPath(service) = *HasProvider::<ReadPath<$service>>::provide(module)?;
                Ok(Box::new(ReadPath($controller::new(service))))
            }
        }
    };
}

controller_providers!(LamodaProductsController over LamodaProductsService {
    write: LamodaProductsWController;
    read: LamodaProductsRController;
});

controller_providers!(TwitchGameController over TwitchGameService {
    write: TwitchGameWController;
    read: TwitchGameRController;
});

controller_providers!(TwitchUserController over TwitchUserService {
    write: TwitchUserWController;
    read: TwitchUserRController;
});

controller_providers!(TwitchStreamController over TwitchStreamService {
    write: TwitchStreamWController;
    read: TwitchStreamRController;
});
