//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DB_MONGO_NAME` - MongoDB database name
//! - `DB_MONGO_USERNAME` - MongoDB user
//! - `DB_MONGO_PASSWORD` - MongoDB password
//! - `DB_MONGO_HOST` - MongoDB host
//! - `TWITCH_CLIENT_ID` - Twitch application client ID
//! - `TWITCH_CLIENT_SECRET` - Twitch application client secret
//!
//! ## Optional
//! - `API_HOST` - Bind address (default: 127.0.0.1)
//! - `API_PORT` - Listen port (default: 8000)
//! - `DB_MONGO_PORT` - MongoDB port (default: 27017)
//! - `DB_MONGO_AUTH_SOURCE` - Authentication database (default: admin)
//! - `ELASTIC_URL` - Elasticsearch base URL (default: <http://localhost:9200>)
//! - `ELASTIC_USERNAME` / `ELASTIC_PASSWORD` - Elasticsearch basic auth
//! - `READ_BACKEND` - Store behind read services, `mongo` or `elastic` (default: mongo)
//! - `LAMODA_BASE_URL` - Lamoda site root (default: <https://www.lamoda.ru>)
//! - `LAMODA_MAX_PAGES` - Catalog pages fetched per parse (default: 1)
//! - `TWITCH_API_URL` - Helix API root (default: <https://api.twitch.tv>)
//! - `TWITCH_AUTH_URL` - OAuth root (default: <https://id.twitch.tv>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use tlparser_core::StorageBackend;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// MongoDB connection settings
    pub mongo: MongoConfig,
    /// Elasticsearch connection settings
    pub elastic: ElasticConfig,
    /// Backend read services are bound to
    pub read_backend: StorageBackend,
    /// Lamoda scraper settings
    pub lamoda: LamodaConfig,
    /// Twitch API settings
    pub twitch: TwitchConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry trace sample rate
    pub sentry_traces_sample_rate: f32,
}

/// MongoDB connection settings.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct MongoConfig {
    pub db_name: String,
    pub username: String,
    pub password: SecretString,
    pub host: String,
    pub port: u16,
    /// Database the credentials are defined in
    pub auth_source: String,
}

impl std::fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoConfig")
            .field("db_name", &self.db_name)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("auth_source", &self.auth_source)
            .finish()
    }
}

/// Elasticsearch connection settings.
#[derive(Clone)]
pub struct ElasticConfig {
    pub url: Url,
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

impl std::fmt::Debug for ElasticConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticConfig")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Lamoda scraper settings.
#[derive(Debug, Clone)]
pub struct LamodaConfig {
    pub base_url: Url,
    /// Upper bound on catalog pages fetched per parse
    pub max_pages: u32,
}

/// Twitch API settings.
#[derive(Clone)]
pub struct TwitchConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub api_url: Url,
    pub auth_url: Url,
}

impl std::fmt::Debug for TwitchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitchConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("api_url", &self.api_url.as_str())
            .field("auth_url", &self.auth_url.as_str())
            .finish()
    }
}

// =============================================================================
// Defaults
// =============================================================================
//
// Used as component parameters when the container module is built without
// explicit settings. They mirror the optional variables' defaults; required
// credentials are left empty.

const DEFAULT_ELASTIC_URL: &str = "http://localhost:9200";
const DEFAULT_LAMODA_URL: &str = "https://www.lamoda.ru";
const DEFAULT_TWITCH_API_URL: &str = "https://api.twitch.tv";
const DEFAULT_TWITCH_AUTH_URL: &str = "https://id.twitch.tv";

fn default_url(url: &'static str) -> Url {
    Url::parse(url).expect("Invalid default URL")
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            db_name: "tlparser".to_string(),
            username: String::new(),
            password: SecretString::from(String::new()),
            host: "localhost".to_string(),
            port: 27017,
            auth_source: "admin".to_string(),
        }
    }
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            url: default_url(DEFAULT_ELASTIC_URL),
            username: None,
            password: None,
        }
    }
}

impl Default for LamodaConfig {
    fn default() -> Self {
        Self {
            base_url: default_url(DEFAULT_LAMODA_URL),
            max_pages: 1,
        }
    }
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: SecretString::from(String::new()),
            api_url: default_url(DEFAULT_TWITCH_API_URL),
            auth_url: default_url(DEFAULT_TWITCH_AUTH_URL),
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default::<IpAddr>("API_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("API_PORT", "8000")?;
        let read_backend = parse_env_or_default::<StorageBackend>("READ_BACKEND", "mongo")?;

        Ok(Self {
            host,
            port,
            mongo: MongoConfig::from_env()?,
            elastic: ElasticConfig::from_env()?,
            read_backend,
            lamoda: LamodaConfig::from_env()?,
            twitch: TwitchConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            db_name: get_required_env("DB_MONGO_NAME")?,
            username: get_required_env("DB_MONGO_USERNAME")?,
            password: get_required_secret("DB_MONGO_PASSWORD")?,
            host: get_required_env("DB_MONGO_HOST")?,
            port: parse_env_or_default("DB_MONGO_PORT", "27017")?,
            auth_source: get_env_or_default("DB_MONGO_AUTH_SOURCE", "admin"),
        })
    }
}

impl ElasticConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: parse_env_or_default("ELASTIC_URL", DEFAULT_ELASTIC_URL)?,
            username: get_optional_env("ELASTIC_USERNAME"),
            password: get_optional_env("ELASTIC_PASSWORD").map(SecretString::from),
        })
    }
}

impl LamodaConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_pages = parse_env_or_default::<u32>("LAMODA_MAX_PAGES", "1")?;
        if max_pages == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "LAMODA_MAX_PAGES".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            base_url: parse_env_or_default("LAMODA_BASE_URL", DEFAULT_LAMODA_URL)?,
            max_pages,
        })
    }
}

impl TwitchConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: get_required_env("TWITCH_CLIENT_ID")?,
            client_secret: get_required_secret("TWITCH_CLIENT_SECRET")?,
            api_url: parse_env_or_default("TWITCH_API_URL", DEFAULT_TWITCH_API_URL)?,
            auth_url: parse_env_or_default("TWITCH_AUTH_URL", DEFAULT_TWITCH_AUTH_URL)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Configuration pointing at local services, for tests that build a container.
    pub(crate) fn test_config(read_backend: StorageBackend) -> ApiConfig {
        ApiConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            mongo: MongoConfig {
                db_name: "tlparser_test".to_string(),
                username: "tlparser".to_string(),
                password: SecretString::from("mongo_password_value"),
                host: "localhost".to_string(),
                port: 27017,
                auth_source: "admin".to_string(),
            },
            elastic: ElasticConfig {
                url: Url::parse("http://localhost:9200").unwrap(),
                username: None,
                password: None,
            },
            read_backend,
            lamoda: LamodaConfig {
                base_url: Url::parse("https://www.lamoda.ru").unwrap(),
                max_pages: 1,
            },
            twitch: TwitchConfig {
                client_id: "client_id_value".to_string(),
                client_secret: SecretString::from("twitch_secret_value"),
                api_url: Url::parse("https://api.twitch.tv").unwrap(),
                auth_url: Url::parse("https://id.twitch.tv").unwrap(),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config(StorageBackend::Mongo);

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_parse_value_reports_key() {
        let err = parse_value::<u16>("API_PORT", "eighty").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "API_PORT"));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ElasticConfig::default().url.as_str(), "http://localhost:9200/");
        assert_eq!(LamodaConfig::default().max_pages, 1);
        assert_eq!(TwitchConfig::default().auth_url.as_str(), "https://id.twitch.tv/");

        let mongo = MongoConfig::default();
        assert!(mongo.username.is_empty());
        assert_eq!((mongo.host.as_str(), mongo.port), ("localhost", 27017));
    }

    #[test]
    fn test_parse_read_backend() {
        let backend: StorageBackend = parse_value("READ_BACKEND", "elastic").unwrap();
        assert_eq!(backend, StorageBackend::Elastic);
        assert!(parse_value::<StorageBackend>("READ_BACKEND", "redis").is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = test_config(StorageBackend::Mongo);

        let mongo_debug = format!("{:?}", config.mongo);
        assert!(mongo_debug.contains("tlparser_test"));
        assert!(mongo_debug.contains("[REDACTED]"));
        assert!(!mongo_debug.contains("mongo_password_value"));

        let twitch_debug = format!("{:?}", config.twitch);
        assert!(twitch_debug.contains("client_id_value"));
        assert!(!twitch_debug.contains("twitch_secret_value"));
    }
}
