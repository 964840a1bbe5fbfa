//! Lamoda catalog entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::ProductSku;
use super::price::Price;
use super::slug::Category;

/// A product card scraped from a Lamoda catalog page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LamodaProduct {
    /// Lamoda SKU, uppercase (e.g. `MP002XW0F8B5`).
    pub sku: ProductSku,
    /// Absolute product page URL.
    pub url: String,
    /// Absolute URL of the first product image, if the card had one.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Catalog category the product was scraped from.
    pub category: Category,
    pub brand: String,
    pub name: String,
    /// Current selling price.
    pub price: Price,
    /// Price before discount, present only for discounted products.
    #[serde(default)]
    pub old_price: Option<Price>,
    /// When this document was produced.
    pub parsed_at: DateTime<Utc>,
}

impl LamodaProduct {
    /// Whether the product is currently discounted.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.old_price
            .is_some_and(|old| old.amount > self.price.amount)
    }
}
