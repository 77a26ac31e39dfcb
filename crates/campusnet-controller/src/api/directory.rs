//! Identity and server handlers.
//!
//! Request bodies use the same shapes as the inventory document, so the core
//! model types deserialize them directly (hardware addresses normalized,
//! port 0 rejected).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use campusnet_core::model::{Identity, Server, Service};

use super::error::ApiResult;
use crate::app_state::AppState;

pub async fn list_identities(State(state): State<AppState>) -> ApiResult<Json<Vec<Identity>>> {
    Ok(Json(state.identities()?))
}

pub async fn create_identity(
    State(state): State<AppState>,
    Json(identity): Json<Identity>,
) -> ApiResult<(StatusCode, Json<Identity>)> {
    state.add_identity(identity.clone())?;
    tracing::info!(id = %identity.id, mac = %identity.hardware_address, "identity added");
    Ok((StatusCode::CREATED, Json(identity)))
}

pub async fn get_identity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Identity>> {
    Ok(Json(state.identity(&id)?))
}

pub async fn delete_identity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.remove_identity(&id)?;
    tracing::info!(id = %id, "identity removed");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_servers(State(state): State<AppState>) -> ApiResult<Json<Vec<Server>>> {
    Ok(Json(state.servers()?))
}

pub async fn create_server(
    State(state): State<AppState>,
    Json(server): Json<Server>,
) -> ApiResult<(StatusCode, Json<Server>)> {
    state.add_server(server.clone())?;
    tracing::info!(server = %server, services = server.services.len(), "server added");
    Ok((StatusCode::CREATED, Json(server)))
}

pub async fn get_server(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Server>> {
    Ok(Json(state.server(&name)?))
}

pub async fn delete_server(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    state.remove_server(&name)?;
    tracing::info!(server = %name, "server removed");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_service(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(service): Json<Service>,
) -> ApiResult<(StatusCode, Json<Service>)> {
    state.add_service(&name, service.clone())?;
    tracing::info!(server = %name, service = %service, "service added");
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn get_service(
    State(state): State<AppState>,
    Path((name, service)): Path<(String, String)>,
) -> ApiResult<Json<Service>> {
    Ok(Json(state.service(&name, &service)?))
}
