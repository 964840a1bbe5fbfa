//! Product card extraction from Lamoda catalog HTML.
//!
//! A catalog page renders one `x-product-card__card` block per product:
//!
//! ```html
//! <div class="x-product-card__card">
//!   <a href="/p/mp002xw0f8b5/clothes-befree-plate/" class="x-product-card__link">
//!     <img class="x-product-card__pic-img" src="//a.lmcdn.ru/img236x341/M/P/MP002XW0F8B5_1.jpg">
//!   </a>
//!   <span class="x-product-card-description__price-new">1 299 ₽</span>
//!   <span class="x-product-card-description__price-old">2 599 ₽</span>
//!   <div class="x-product-card-description__brand-name">Befree</div>
//!   <div class="x-product-card-description__product-name">Платье</div>
//! </div>
//! ```
//!
//! Non-discounted products carry a single `__price-single` span instead of
//! the new/old pair. Cards without a product link or a price are skipped.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use url::Url;

use tlparser_core::{Category, LamodaProduct, Price, ProductSku};

static CARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"class="[^"]*\bx-product-card__card\b[^"]*""#).expect("Invalid regex")
});

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href="((?:https?://[^/"]+)?/p/([A-Za-z0-9]+)/[^"]*)""#).expect("Invalid regex")
});

static IMG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<img\b[^>]*\bx-product-card__pic-img\b[^>]*>"#).expect("Invalid regex")
});

static SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bsrc="([^"]+)""#).expect("Invalid regex"));

static BRAND_RE: LazyLock<Regex> =
    LazyLock::new(|| element_text_re("x-product-card-description__brand-name"));

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| element_text_re("x-product-card-description__product-name"));

static PRICE_SINGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| element_text_re("x-product-card-description__price-single"));

static PRICE_NEW_RE: LazyLock<Regex> =
    LazyLock::new(|| element_text_re("x-product-card-description__price-new"));

static PRICE_OLD_RE: LazyLock<Regex> =
    LazyLock::new(|| element_text_re("x-product-card-description__price-old"));

/// Regex capturing the text content of the first element carrying `class`.
fn element_text_re(class: &str) -> Regex {
    Regex::new(&format!(
        r#"class="[^"]*\b{}\b[^"]*"[^>]*>\s*([^<]*?)\s*<"#,
        regex::escape(class)
    ))
    .expect("Invalid regex")
}

/// Extract every product card on a catalog page.
///
/// Relative links and scheme-relative image URLs are resolved against `base_url`.
#[must_use]
pub fn parse_catalog_page(
    html: &str,
    base_url: &Url,
    category: &Category,
    parsed_at: DateTime<Utc>,
) -> Vec<LamodaProduct> {
    let starts: Vec<usize> = CARD_RE.find_iter(html).map(|m| m.start()).collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(html.len());
            let card = html.get(start..end)?;
            parse_card(card, base_url, category, parsed_at)
        })
        .collect()
}

fn parse_card(
    card: &str,
    base_url: &Url,
    category: &Category,
    parsed_at: DateTime<Utc>,
) -> Option<LamodaProduct> {
    let link = LINK_RE.captures(card)?;
    let href = link.get(1)?.as_str();
    let sku = link.get(2)?.as_str().to_ascii_uppercase();
    let url = base_url.join(&decode_entities(href)).ok()?;

    let (price, old_price) = match capture_text(&PRICE_SINGLE_RE, card).and_then(|t| parse_price(&t)) {
        Some(single) => (single, None),
        None => {
            let new = capture_text(&PRICE_NEW_RE, card).and_then(|t| parse_price(&t))?;
            let old = capture_text(&PRICE_OLD_RE, card).and_then(|t| parse_price(&t));
            (new, old)
        }
    };

    let image_url = IMG_RE
        .find(card)
        .and_then(|img| SRC_RE.captures(img.as_str()))
        .and_then(|src| src.get(1))
        .and_then(|src| base_url.join(&decode_entities(src.as_str())).ok())
        .map(String::from);

    Some(LamodaProduct {
        sku: ProductSku::new(sku),
        url: url.into(),
        image_url,
        category: category.clone(),
        brand: capture_text(&BRAND_RE, card).unwrap_or_default(),
        name: capture_text(&NAME_RE, card).unwrap_or_default(),
        price: Price::rub(price),
        old_price: old_price.map(Price::rub),
        parsed_at,
    })
}

fn capture_text(re: &Regex, card: &str) -> Option<String> {
    re.captures(card)
        .and_then(|c| c.get(1))
        .map(|m| decode_entities(m.as_str()))
        .filter(|s| !s.is_empty())
}

/// Parse a displayed price such as `1 299 ₽` or `1 299,50 ₽`.
///
/// Group separators (spaces, no-break spaces, thin spaces) and the currency
/// sign are dropped; a comma is treated as the decimal separator.
#[must_use]
pub fn parse_price(text: &str) -> Option<Decimal> {
    let normalized: String = text
        .chars()
        .filter_map(|c| match c {
            '0'..='9' | '.' => Some(c),
            ',' => Some('.'),
            _ => None,
        })
        .collect();

    if normalized.is_empty() {
        return None;
    }

    Decimal::from_str(&normalized).ok()
}

/// Decode the handful of HTML entities that show up in card text and attributes.
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.trim().to_owned();
    }

    s.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<div class="grid__catalog">
  <div class="x-product-card__card x-product-card__card_catalog">
    <a href="/p/mp002xw0f8b5/clothes-befree-plate/" class="x-product-card__link x-product-card__hit-area">
      <img class="x-product-card__pic-img" alt="" src="//a.lmcdn.ru/img236x341/M/P/MP002XW0F8B5_1.jpg">
    </a>
    <div class="x-product-card-description">
      <div class="x-product-card-description__microdata-wrap">
        <span class="x-product-card-description__price-new x-product-card-description__price-WEB8507_price_bold">1 299 ₽</span>
        <span class="x-product-card-description__price-old">2&nbsp;599 ₽</span>
      </div>
      <div class="x-product-card-description__brand-name">Befree</div>
      <div class="x-product-card-description__product-name">Платье</div>
    </div>
  </div>
  <div class="x-product-card__card">
    <a href="https://www.lamoda.ru/p/rtlaca123401/shoes-h-m-kedy/" class="x-product-card__link">
      <img src="https://a.lmcdn.ru/img236x341/R/T/RTLACA123401_1.jpg" class="x-product-card__pic-img">
    </a>
    <span class="x-product-card-description__price-single">3 499 ₽</span>
    <div class="x-product-card-description__brand-name">H&amp;M</div>
    <div class="x-product-card-description__product-name">Кеды</div>
  </div>
  <div class="x-product-card__card">
    <span class="x-product-card-description__brand-name">Ad slot without link</span>
  </div>
</div>
</body></html>
"#;

    fn parse(html: &str) -> Vec<LamodaProduct> {
        parse_catalog_page(
            html,
            &Url::parse("https://www.lamoda.ru").unwrap(),
            &Category::parse("4153").unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn test_parse_catalog_page() {
        let products = parse(PAGE);
        assert_eq!(products.len(), 2);

        let dress = &products[0];
        assert_eq!(dress.sku.as_str(), "MP002XW0F8B5");
        assert_eq!(
            dress.url,
            "https://www.lamoda.ru/p/mp002xw0f8b5/clothes-befree-plate/"
        );
        assert_eq!(
            dress.image_url.as_deref(),
            Some("https://a.lmcdn.ru/img236x341/M/P/MP002XW0F8B5_1.jpg")
        );
        assert_eq!(dress.brand, "Befree");
        assert_eq!(dress.name, "Платье");
        assert_eq!(dress.price.amount, Decimal::new(1299, 0));
        assert_eq!(dress.old_price.unwrap().amount, Decimal::new(2599, 0));
        assert_eq!(dress.category.as_str(), "4153");
    }

    #[test]
    fn test_parse_single_price_card() {
        let products = parse(PAGE);
        let sneakers = &products[1];

        assert_eq!(sneakers.sku.as_str(), "RTLACA123401");
        assert_eq!(sneakers.brand, "H&M");
        assert_eq!(sneakers.price.amount, Decimal::new(3499, 0));
        assert!(sneakers.old_price.is_none());
        assert!(!sneakers.is_discounted());
    }

    #[test]
    fn test_parse_page_without_cards() {
        assert!(parse("<html><body><h1>Ничего не найдено</h1></body></html>").is_empty());
    }

    #[test]
    fn test_card_without_price_is_skipped() {
        let html = r#"<div class="x-product-card__card"><a href="/p/abc123/x/">x</a></div>"#;
        assert!(parse(html).is_empty());
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("1 299 ₽"), Some(Decimal::new(1299, 0)));
        assert_eq!(parse_price("12\u{a0}999\u{2009}₽"), Some(Decimal::new(12999, 0)));
        assert_eq!(parse_price("1 299,50 ₽"), Some(Decimal::new(129_950, 2)));
        assert_eq!(parse_price("₽"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("H&amp;M"), "H&M");
        assert_eq!(decode_entities(" Levi&#39;s "), "Levi's");
        assert_eq!(decode_entities("plain"), "plain");
    }
}
