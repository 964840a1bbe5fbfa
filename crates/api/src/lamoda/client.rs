//! Lamoda catalog HTTP client.

use std::collections::HashSet;

use chrono::Utc;
use reqwest::StatusCode;
use tracing::instrument;
use url::Url;

use tlparser_core::{Category, LamodaProduct};

use super::{LamodaError, parser};
use crate::config::LamodaConfig;

/// Fetches catalog pages for a category and turns them into products.
///
/// Holds a clone of the shared HTTP client, so constructing one per request
/// is cheap.
#[derive(Debug, Clone)]
pub struct LamodaClient {
    client: reqwest::Client,
    base_url: Url,
    max_pages: u32,
}

impl LamodaClient {
    /// Create a client for the configured Lamoda storefront.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &LamodaConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            max_pages: config.max_pages,
        }
    }

    /// Storefront the client scrapes.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Scrape up to `max_pages` catalog pages of a category.
    ///
    /// Stops early at the first page that renders no product cards or that
    /// Lamoda answers 404 for, keeping what earlier pages produced. Products
    /// repeated across pages are kept once, first occurrence wins.
    ///
    /// # Errors
    ///
    /// Returns `LamodaError::CategoryNotFound` if Lamoda answers 404 for page 1,
    /// `LamodaError::RateLimited` on 429, and `LamodaError::Http` on
    /// transport failures.
    #[instrument(skip(self), fields(category = %category, max_pages = self.max_pages))]
    pub async fn fetch_category(
        &self,
        category: &Category,
    ) -> Result<Vec<LamodaProduct>, LamodaError> {
        let mut seen = HashSet::new();
        let mut products = Vec::new();

        for page in 1..=self.max_pages {
            let html = match self.fetch_page(category, page).await {
                Ok(html) => html,
                Err(LamodaError::CategoryNotFound(_)) if page > 1 => {
                    tracing::debug!(page, "Catalog page not found, stopping");
                    break;
                }
                Err(e) => return Err(e),
            };
            let parsed = parser::parse_catalog_page(&html, &self.base_url, category, Utc::now());

            if parsed.is_empty() {
                tracing::debug!(page, "Catalog page has no product cards, stopping");
                break;
            }

            tracing::debug!(page, count = parsed.len(), "Catalog page parsed");
            products.extend(parsed.into_iter().filter(|p| seen.insert(p.sku.clone())));
        }

        tracing::info!(count = products.len(), "Lamoda category scraped");
        Ok(products)
    }

    async fn fetch_page(&self, category: &Category, page: u32) -> Result<String, LamodaError> {
        let url = self.category_url(category, page)?;
        let response = self.client.get(url.clone()).send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.text().await?),
            StatusCode::NOT_FOUND => Err(LamodaError::CategoryNotFound(category.to_string())),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60);
                Err(LamodaError::RateLimited(retry_after))
            }
            status => Err(LamodaError::Status {
                status: status.as_u16(),
                url: url.into(),
            }),
        }
    }

    /// Catalog URL for one page: `{base}/c/{category}/?page={page}`.
    fn category_url(&self, category: &Category, page: u32) -> Result<Url, LamodaError> {
        let mut url = self.base_url.join(&format!("/c/{category}/"))?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());
        Ok(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    fn client_at(base_url: &str, max_pages: u32) -> LamodaClient {
        LamodaClient::new(
            reqwest::Client::new(),
            &LamodaConfig {
                base_url: Url::parse(base_url).unwrap(),
                max_pages,
            },
        )
    }

    fn client(max_pages: u32) -> LamodaClient {
        client_at("https://www.lamoda.ru", max_pages)
    }

    fn dresses() -> Category {
        Category::parse("4153").unwrap()
    }

    /// Catalog page with one product card per SKU.
    fn catalog(skus: &[&str]) -> String {
        let cards: String = skus
            .iter()
            .map(|sku| {
                format!(
                    r#"<div class="x-product-card__card">
  <a href="/p/{sku}/clothes-befree-plate/" class="x-product-card__link"></a>
  <span class="x-product-card-description__price-single">1 299 ₽</span>
  <div class="x-product-card-description__brand-name">Befree</div>
  <div class="x-product-card-description__product-name">Платье</div>
</div>
"#
                )
            })
            .collect();

        format!("<html><body>{cards}</body></html>")
    }

    #[test]
    fn test_category_url() {
        let url = client(3).category_url(&dresses(), 2).unwrap();

        assert_eq!(url.as_str(), "https://www.lamoda.ru/c/4153/?page=2");
    }

    #[test]
    fn test_category_url_with_slug() {
        let category = Category::parse("clothes_women-dresses").unwrap();
        let url = client(1).category_url(&category, 1).unwrap();

        assert_eq!(url.as_str(), "https://www.lamoda.ru/c/clothes_women-dresses/?page=1");
    }

    #[tokio::test]
    async fn test_fetch_category_stops_at_empty_page() {
        let server = MockServer::start_async().await;

        let page1 = server
            .mock_async(|when, then| {
                when.method(GET).path("/c/4153/").query_param("page", "1");
                then.status(200).body(catalog(&["mp002xw0f8b5", "rtlaca123401"]));
            })
            .await;
        let page2 = server
            .mock_async(|when, then| {
                when.method(GET).path("/c/4153/").query_param("page", "2");
                then.status(200).body(catalog(&[]));
            })
            .await;
        let page3 = server
            .mock_async(|when, then| {
                when.method(GET).path("/c/4153/").query_param("page", "3");
                then.status(200).body(catalog(&["he002embxyz1"]));
            })
            .await;

        let products = client_at(&server.base_url(), 3)
            .fetch_category(&dresses())
            .await
            .unwrap();

        page1.assert_async().await;
        page2.assert_async().await;
        page3.assert_hits_async(0).await;
        assert_eq!(products.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_category_dedupes_skus_across_pages() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/c/4153/").query_param("page", "1");
                then.status(200).body(catalog(&["mp002xw0f8b5", "rtlaca123401"]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/c/4153/").query_param("page", "2");
                then.status(200).body(catalog(&["rtlaca123401", "he002embxyz1"]));
            })
            .await;

        let products = client_at(&server.base_url(), 2)
            .fetch_category(&dresses())
            .await
            .unwrap();

        let skus: Vec<&str> = products.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, ["MP002XW0F8B5", "RTLACA123401", "HE002EMBXYZ1"]);
        assert!(products.iter().all(|p| p.url.starts_with(&server.base_url())));
    }

    #[tokio::test]
    async fn test_fetch_category_keeps_products_when_later_page_is_missing() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/c/4153/").query_param("page", "1");
                then.status(200).body(catalog(&["mp002xw0f8b5"]));
            })
            .await;
        let missing = server
            .mock_async(|when, then| {
                when.method(GET).path("/c/4153/").query_param("page", "2");
                then.status(404);
            })
            .await;

        let products = client_at(&server.base_url(), 3)
            .fetch_category(&dresses())
            .await
            .unwrap();

        assert_eq!(products.len(), 1);
        missing.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_fetch_category_not_found() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/c/4153/");
                then.status(404);
            })
            .await;

        let err = client_at(&server.base_url(), 3)
            .fetch_category(&dresses())
            .await
            .unwrap_err();

        assert!(matches!(err, LamodaError::CategoryNotFound(ref c) if c == "4153"));
    }

    #[tokio::test]
    async fn test_fetch_category_rate_limited() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/c/4153/");
                then.status(429).header("Retry-After", "17");
            })
            .await;

        let err = client_at(&server.base_url(), 1)
            .fetch_category(&dresses())
            .await
            .unwrap_err();

        assert!(matches!(err, LamodaError::RateLimited(17)));
    }

    #[tokio::test]
    async fn test_fetch_category_unexpected_status() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/c/4153/");
                then.status(503);
            })
            .await;

        let err = client_at(&server.base_url(), 1)
            .fetch_category(&dresses())
            .await
            .unwrap_err();

        assert!(matches!(err, LamodaError::Status { status: 503, .. }));
    }
}
