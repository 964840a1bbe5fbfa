//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::container::{Container, ContainerError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Handlers resolve their
/// controllers from the container on every request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    container: Container,
}

impl AppState {
    /// Create application state around a fresh container.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError` if the container's singletons cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ContainerError> {
        Ok(Self::with_container(Container::new(config)?))
    }

    /// Create application state around an existing container.
    #[must_use]
    pub fn with_container(container: Container) -> Self {
        Self {
            inner: Arc::new(AppStateInner { container }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        self.inner.container.config()
    }

    /// Get a reference to the dependency container.
    #[must_use]
    pub fn container(&self) -> &Container {
        &self.inner.container
    }
}
