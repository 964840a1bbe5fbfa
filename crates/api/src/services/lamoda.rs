//! Lamoda products service.

use std::sync::Arc;

use tracing::instrument;

use tlparser_core::{Category, LamodaProduct};

use super::ServiceError;
use crate::db::ProductsRepository;
use crate::lamoda::LamodaClient;

/// Scrapes Lamoda categories into a products repository and serves them back.
pub struct LamodaProductsService {
    repository: Arc<dyn ProductsRepository>,
    mirror: Option<Arc<dyn ProductsRepository>>,
    scraper: LamodaClient,
}

impl LamodaProductsService {
    #[must_use]
    pub fn new(repository: Arc<dyn ProductsRepository>, scraper: LamodaClient) -> Self {
        Self {
            repository,
            mirror: None,
            scraper,
        }
    }

    /// Repeat every write on `mirror` after it succeeds on the repository.
    #[must_use]
    pub fn with_mirror(mut self, mirror: Arc<dyn ProductsRepository>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    /// Repository this instance reads and writes.
    #[must_use]
    pub fn repository(&self) -> &Arc<dyn ProductsRepository> {
        &self.repository
    }

    #[must_use]
    pub fn mirror(&self) -> Option<&Arc<dyn ProductsRepository>> {
        self.mirror.as_ref()
    }

    /// Scrape a category and store its products.
    ///
    /// Returns the number of products stored.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Lamoda` if scraping fails and
    /// `ServiceError::Repository` if storing fails.
    #[instrument(skip(self), fields(category = %category, backend = %self.repository.backend()))]
    pub async fn parse_products(&self, category: &Category) -> Result<u64, ServiceError> {
        let products = self.scraper.fetch_category(category).await?;

        if products.is_empty() {
            tracing::warn!("No products found in category");
            return Ok(0);
        }

        let saved = self.repository.save_many(&products).await?;
        if let Some(mirror) = &self.mirror {
            mirror.save_many(&products).await?;
        }
        tracing::info!(saved, "Lamoda products stored");

        Ok(saved)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn get_all_products(&self) -> Result<Vec<LamodaProduct>, ServiceError> {
        Ok(self.repository.find_all().await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn get_products_by_category(
        &self,
        category: &Category,
    ) -> Result<Vec<LamodaProduct>, ServiceError> {
        Ok(self.repository.find_by_category(category).await?)
    }

    /// Returns the number of deleted products.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete_all_products(&self) -> Result<u64, ServiceError> {
        let deleted = self.repository.delete_all().await?;
        if let Some(mirror) = &self.mirror {
            mirror.delete_all().await?;
        }
        tracing::info!(deleted, "Lamoda products deleted");
        Ok(deleted)
    }

    /// Returns the number of deleted products.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the delete fails.
    #[instrument(skip(self), fields(category = %category))]
    pub async fn delete_products_by_category(&self, category: &Category) -> Result<u64, ServiceError> {
        let deleted = self.repository.delete_by_category(category).await?;
        if let Some(mirror) = &self.mirror {
            mirror.delete_by_category(category).await?;
        }
        tracing::info!(deleted, "Lamoda products deleted");
        Ok(deleted)
    }
}
