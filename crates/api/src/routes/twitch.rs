//! `api.v1.twitch.*` handlers.
//!
//! Parse and delete go through the write controllers, listing and lookup
//! through the read controllers.

use axum::{
    Json,
    extract::{Path, State},
};

use tlparser_core::{TwitchGame, TwitchStream, TwitchUser};

use crate::controllers::{DeletedResponse, ParsedResponse};
use crate::error::Result;
use crate::state::AppState;

// =============================================================================
// api.v1.twitch.games
// =============================================================================

pub async fn parse_games(State(state): State<AppState>) -> Result<Json<ParsedResponse>> {
    let controller = state.container().twitch_game_w_controller()?;
    Ok(Json(controller.parse().await?))
}

pub async fn list_games(State(state): State<AppState>) -> Result<Json<Vec<TwitchGame>>> {
    let controller = state.container().twitch_game_r_controller()?;
    Ok(Json(controller.list().await?))
}

pub async fn delete_games(State(state): State<AppState>) -> Result<Json<DeletedResponse>> {
    let controller = state.container().twitch_game_w_controller()?;
    Ok(Json(controller.delete_all().await?))
}

// =============================================================================
// api.v1.twitch.users
// =============================================================================

pub async fn parse_user(
    State(state): State<AppState>,
    Path(login): Path<String>,
) -> Result<Json<TwitchUser>> {
    let controller = state.container().twitch_user_w_controller()?;
    Ok(Json(controller.parse(&login).await?))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<TwitchUser>>> {
    let controller = state.container().twitch_user_r_controller()?;
    Ok(Json(controller.list().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(login): Path<String>,
) -> Result<Json<TwitchUser>> {
    let controller = state.container().twitch_user_r_controller()?;
    Ok(Json(controller.get(&login).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(login): Path<String>,
) -> Result<Json<DeletedResponse>> {
    let controller = state.container().twitch_user_w_controller()?;
    Ok(Json(controller.delete(&login).await?))
}

// =============================================================================
// api.v1.twitch.streams
// =============================================================================

pub async fn parse_streams(State(state): State<AppState>) -> Result<Json<ParsedResponse>> {
    let controller = state.container().twitch_stream_w_controller()?;
    Ok(Json(controller.parse().await?))
}

pub async fn list_streams(State(state): State<AppState>) -> Result<Json<Vec<TwitchStream>>> {
    let controller = state.container().twitch_stream_r_controller()?;
    Ok(Json(controller.list().await?))
}

pub async fn delete_streams(State(state): State<AppState>) -> Result<Json<DeletedResponse>> {
    let controller = state.container().twitch_stream_w_controller()?;
    Ok(Json(controller.delete_all().await?))
}
