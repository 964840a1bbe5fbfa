//! `api.v1.lamoda.products` handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use tlparser_core::LamodaProduct;

use crate::controllers::{DeletedResponse, ParsedResponse};
use crate::error::Result;
use crate::state::AppState;

/// Scrape a category and store its products.
pub async fn parse(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<ParsedResponse>> {
    let controller = state.container().lamoda_products_w_controller()?;
    Ok(Json(controller.parse(&category).await?))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<LamodaProduct>>> {
    let controller = state.container().lamoda_products_r_controller()?;
    Ok(Json(controller.list().await?))
}

pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<LamodaProduct>>> {
    let controller = state.container().lamoda_products_r_controller()?;
    Ok(Json(controller.list_by_category(&category).await?))
}

pub async fn delete_all(State(state): State<AppState>) -> Result<Json<DeletedResponse>> {
    let controller = state.container().lamoda_products_w_controller()?;
    Ok(Json(controller.delete_all().await?))
}

pub async fn delete_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<DeletedResponse>> {
    let controller = state.container().lamoda_products_w_controller()?;
    Ok(Json(controller.delete_by_category(&category).await?))
}
