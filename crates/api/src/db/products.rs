//! Lamoda product repositories.
//!
//! Products are keyed by `sku`. Saving a product that already exists
//! replaces it, so re-parsing a category refreshes prices in place.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use serde_json::{Value, json};

use tlparser_core::{Category, LamodaProduct, StorageBackend};

use super::elastic::MAX_SEARCH_SIZE;
use super::{ElasticSearchDatabase, LAMODA_PRODUCTS, MongoDatabase, RepositoryError};

/// Storage of scraped Lamoda products.
#[async_trait]
pub trait ProductsRepository: Send + Sync {
    /// Insert or replace products by SKU. Returns the number saved.
    async fn save_many(&self, products: &[LamodaProduct]) -> Result<u64, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<LamodaProduct>, RepositoryError>;

    async fn find_by_category(
        &self,
        category: &Category,
    ) -> Result<Vec<LamodaProduct>, RepositoryError>;

    /// Returns the number of deleted products.
    async fn delete_all(&self) -> Result<u64, RepositoryError>;

    /// Returns the number of deleted products.
    async fn delete_by_category(&self, category: &Category) -> Result<u64, RepositoryError>;

    /// Store this repository reads and writes.
    fn backend(&self) -> StorageBackend;
}

// =============================================================================
// MongoDB
// =============================================================================

/// Products stored in the `lamoda_products` collection.
pub struct LamodaProductsMongoRepository {
    db: Arc<MongoDatabase>,
}

impl LamodaProductsMongoRepository {
    #[must_use]
    pub const fn new(db: Arc<MongoDatabase>) -> Self {
        Self { db }
    }

    /// Database handle this repository uses.
    #[must_use]
    pub const fn database(&self) -> &Arc<MongoDatabase> {
        &self.db
    }

    fn collection(&self) -> mongodb::Collection<LamodaProduct> {
        self.db.collection(LAMODA_PRODUCTS)
    }
}

#[async_trait]
impl ProductsRepository for LamodaProductsMongoRepository {
    async fn save_many(&self, products: &[LamodaProduct]) -> Result<u64, RepositoryError> {
        let collection = self.collection();

        for product in products {
            collection
                .replace_one(doc! { "sku": product.sku.as_str() }, product)
                .upsert(true)
                .await?;
        }

        Ok(products.len() as u64)
    }

    async fn find_all(&self) -> Result<Vec<LamodaProduct>, RepositoryError> {
        let cursor = self.collection().find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_category(
        &self,
        category: &Category,
    ) -> Result<Vec<LamodaProduct>, RepositoryError> {
        let cursor = self
            .collection()
            .find(doc! { "category": category.as_str() })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = self.collection().delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    async fn delete_by_category(&self, category: &Category) -> Result<u64, RepositoryError> {
        let result = self
            .collection()
            .delete_many(doc! { "category": category.as_str() })
            .await?;
        Ok(result.deleted_count)
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Mongo
    }
}

// =============================================================================
// Elasticsearch
// =============================================================================

/// Products stored in the `lamoda_products` index, document ID = SKU.
pub struct LamodaProductsElasticRepository {
    es: Arc<ElasticSearchDatabase>,
}

impl LamodaProductsElasticRepository {
    #[must_use]
    pub const fn new(es: Arc<ElasticSearchDatabase>) -> Self {
        Self { es }
    }

    /// Elasticsearch handle this repository uses.
    #[must_use]
    pub const fn database(&self) -> &Arc<ElasticSearchDatabase> {
        &self.es
    }
}

/// Exact match on category. Dynamic mapping indexes strings as `text` with
/// a `keyword` sub-field, and slugs like `women-dresses` must not be tokenized.
fn category_query(category: &Category) -> Value {
    json!({ "term": { "category.keyword": category.as_str() } })
}

#[async_trait]
impl ProductsRepository for LamodaProductsElasticRepository {
    async fn save_many(&self, products: &[LamodaProduct]) -> Result<u64, RepositoryError> {
        let docs: Vec<(String, &LamodaProduct)> = products
            .iter()
            .map(|p| (p.sku.to_string(), p))
            .collect();

        self.es.bulk_index(LAMODA_PRODUCTS, &docs).await
    }

    async fn find_all(&self) -> Result<Vec<LamodaProduct>, RepositoryError> {
        self.es
            .search(LAMODA_PRODUCTS, json!({ "match_all": {} }), MAX_SEARCH_SIZE)
            .await
    }

    async fn find_by_category(
        &self,
        category: &Category,
    ) -> Result<Vec<LamodaProduct>, RepositoryError> {
        self.es
            .search(LAMODA_PRODUCTS, category_query(category), MAX_SEARCH_SIZE)
            .await
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        self.es
            .delete_by_query(LAMODA_PRODUCTS, json!({ "match_all": {} }))
            .await
    }

    async fn delete_by_category(&self, category: &Category) -> Result<u64, RepositoryError> {
        self.es
            .delete_by_query(LAMODA_PRODUCTS, category_query(category))
            .await
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Elastic
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_query_matches_keyword() {
        let category = Category::parse("clothes_women-dresses").unwrap();

        assert_eq!(
            category_query(&category),
            json!({ "term": { "category.keyword": "clothes_women-dresses" } })
        );
    }
}
