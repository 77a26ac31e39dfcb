//! Inventory export / import (YAML bodies).

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::app_state::AppState;
use crate::inventory::{self, ImportSummary};

use super::error::ApiResult;

const YAML_CONTENT_TYPE: &str = "application/yaml";

pub async fn export(State(state): State<AppState>) -> ApiResult<Response> {
    let doc = state.export_inventory()?;
    let body = inventory::to_yaml_string(&doc)?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, YAML_CONTENT_TYPE)], body).into_response())
}

/// Additive import; a conflicting entry rejects the whole document.
pub async fn import(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<Json<ImportSummary>> {
    let doc = inventory::load_from_str(&body)?;
    Ok(Json(state.import_inventory(doc)?))
}
