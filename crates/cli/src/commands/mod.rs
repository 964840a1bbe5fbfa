//! CLI command implementations.

pub mod parse;
pub mod setup;
pub mod sync;

use thiserror::Error;

use tlparser_api::config::{ApiConfig, ConfigError};
use tlparser_api::container::{Container, ContainerError};
use tlparser_api::db::RepositoryError;
use tlparser_api::services::ServiceError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A provider could not be constructed.
    #[error("Setup error: {0}")]
    Container(#[from] ContainerError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Service operation failed.
    #[error("{0}")]
    Service(#[from] ServiceError),
}

/// Build the container from environment variables (and `.env`).
///
/// # Errors
///
/// Returns `CommandError::Config` if required variables are missing and
/// `CommandError::Container` if the singletons cannot be built.
pub fn container() -> Result<Container, CommandError> {
    let config = ApiConfig::from_env()?;
    Ok(Container::new(config)?)
}
