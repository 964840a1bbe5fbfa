//! Integration tests for the Lamoda products endpoints.
//!
//! These tests require:
//! - The API server running (cargo run -p tlparser-api)
//! - MongoDB reachable by the server (and Elasticsearch if `READ_BACKEND=elastic`)
//! - Network access to lamoda.ru
//!
//! Run with: cargo test -p tlparser-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::Value;
use tlparser_core::LamodaProduct;
use tlparser_integration_tests::{api_base_url, client, expect_json};

/// Lamoda category used by the tests (women's dresses).
fn test_category() -> String {
    std::env::var("LAMODA_TEST_CATEGORY").unwrap_or_else(|_| "4153".to_string())
}

#[tokio::test]
#[ignore = "Requires running API server, MongoDB and lamoda.ru"]
async fn test_parse_list_delete_category() {
    let client = client();
    let base_url = format!("{}/api/v1/lamoda/products", api_base_url());
    let category = test_category();

    let resp = client
        .post(format!("{base_url}/{category}"))
        .send()
        .await
        .expect("Failed to parse category");
    let parsed: Value = expect_json(resp, StatusCode::OK).await;
    let parsed = parsed["parsed"].as_u64().expect("parsed count");
    assert!(parsed > 0, "category {category} yielded no products");

    let resp = client
        .get(format!("{base_url}/{category}"))
        .send()
        .await
        .expect("Failed to list category");
    let products: Vec<LamodaProduct> = expect_json(resp, StatusCode::OK).await;
    assert!(products.len() as u64 >= parsed);
    assert!(products.iter().all(|p| p.category.as_str() == category));

    let resp = client
        .delete(format!("{base_url}/{category}"))
        .send()
        .await
        .expect("Failed to delete category");
    let deleted: Value = expect_json(resp, StatusCode::OK).await;
    assert!(deleted["deleted"].as_u64().expect("deleted count") >= parsed);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_invalid_category_is_bad_request() {
    let resp = client()
        .post(format!("{}/api/v1/lamoda/products/Not_A_Slug", api_base_url()))
        .send()
        .await
        .expect("Failed to call API");

    let body: Value = expect_json(resp, StatusCode::BAD_REQUEST).await;
    assert!(body["error"].is_string());
}
