use tlparser_core::{Category, LamodaProduct};

use super::{DeletedResponse, ParsedResponse};
use crate::error::Result;
use crate::services::{LamodaProductsService, ServiceError};

pub struct LamodaProductsController {
    service: LamodaProductsService,
}

impl LamodaProductsController {
    #[must_use]
    pub const fn new(service: LamodaProductsService) -> Self {
        Self { service }
    }

    #[must_use]
    pub const fn service(&self) -> &LamodaProductsService {
        &self.service
    }

    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an invalid category.
    pub async fn parse(&self, category: &str) -> Result<ParsedResponse> {
        let category = parse_category(category)?;
        let parsed = self.service.parse_products(&category).await?;
        Ok(ParsedResponse { parsed })
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<LamodaProduct>> {
        Ok(self.service.get_all_products().await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an invalid category.
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<LamodaProduct>> {
        let category = parse_category(category)?;
        Ok(self.service.get_products_by_category(&category).await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the delete fails.
    pub async fn delete_all(&self) -> Result<DeletedResponse> {
        let deleted = self.service.delete_all_products().await?;
        Ok(DeletedResponse { deleted })
    }

    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an invalid category.
    pub async fn delete_by_category(&self, category: &str) -> Result<DeletedResponse> {
        let category = parse_category(category)?;
        let deleted = self.service.delete_products_by_category(&category).await?;
        Ok(DeletedResponse { deleted })
    }
}

fn parse_category(raw: &str) -> std::result::Result<Category, ServiceError> {
    Ok(Category::parse(raw)?)
}
