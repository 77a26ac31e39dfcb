//! Connection handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use campusnet_core::model::Connection;

use super::error::ApiResult;
use crate::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectRequest {
    pub identity: String,
    pub server: String,
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub handler: String,
}

#[derive(Debug, Serialize)]
pub struct Removed {
    pub removed: bool,
}

pub async fn list(State(state): State<AppState>) -> Json<Vec<Connection>> {
    Json(state.connections())
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<ConnectRequest>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let handler = state
        .create_connection(&req.identity, &req.server, &req.service)
        .await?;
    Ok((StatusCode::CREATED, Json(Created { handler })))
}

pub async fn get(
    State(state): State<AppState>,
    Path(handler): Path<String>,
) -> ApiResult<Json<Connection>> {
    Ok(Json(state.connection(&handler)?))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(handler): Path<String>,
) -> ApiResult<Json<Removed>> {
    let removed = state.remove_connection(&handler).await?;
    Ok(Json(Removed { removed }))
}
