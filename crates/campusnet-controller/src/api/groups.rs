//! Enrollment group and policy query handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use campusnet_core::model::{GroupStatus, Identity};

use super::error::ApiResult;
use crate::app_state::AppState;
use crate::inventory::GroupDocument;
use crate::policy::allowlist::parse_rule;
use crate::policy::AccessDecision;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusUpdate {
    pub status: GroupStatus,
}

/// Allow rule in compact `server:service` form.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleBody {
    pub rule: String,
}

#[derive(Debug, Serialize)]
pub struct Changed {
    pub changed: bool,
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    pub identity: String,
    pub server: String,
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl From<AccessDecision> for AuthorizeResponse {
    fn from(d: AccessDecision) -> Self {
        match d {
            AccessDecision::Allow { group } => Self {
                allowed: true,
                group: Some(group),
                reason: None,
            },
            AccessDecision::Deny(r) => Self {
                allowed: false,
                group: None,
                reason: Some(r.as_str()),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PolicyQuery {
    pub server: String,
    pub service: String,
}

pub async fn list_groups(State(state): State<AppState>) -> ApiResult<Json<Vec<GroupDocument>>> {
    let groups = state.groups()?;
    Ok(Json(groups.iter().map(GroupDocument::from_group).collect()))
}

pub async fn create_group(
    State(state): State<AppState>,
    Json(doc): Json<GroupDocument>,
) -> ApiResult<(StatusCode, Json<GroupDocument>)> {
    let group = doc.into_group();
    let out = GroupDocument::from_group(&group);
    state.add_group(group)?;
    tracing::info!(group = %out.code, members = out.members.len(), "group added");
    Ok((StatusCode::CREATED, Json(out)))
}

pub async fn get_group(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<GroupDocument>> {
    Ok(Json(GroupDocument::from_group(&state.group(&code)?)))
}

pub async fn delete_group(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<StatusCode> {
    state.remove_group(&code)?;
    tracing::info!(group = %code, "group removed");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_status(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<StatusUpdate>,
) -> ApiResult<StatusCode> {
    state.set_group_status(&code, req.status)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_members(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<Vec<Identity>>> {
    Ok(Json(state.group_members(&code)?))
}

pub async fn add_member(
    State(state): State<AppState>,
    Path((code, id)): Path<(String, String)>,
) -> ApiResult<Json<Changed>> {
    let changed = state.add_member(&code, &id)?;
    Ok(Json(Changed { changed }))
}

pub async fn remove_member(
    State(state): State<AppState>,
    Path((code, id)): Path<(String, String)>,
) -> ApiResult<Json<Changed>> {
    let changed = state.remove_member(&code, &id)?;
    Ok(Json(Changed { changed }))
}

pub async fn add_rule(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<RuleBody>,
) -> ApiResult<Json<Changed>> {
    let rule = parse_rule(&req.rule)?;
    let changed = state.add_allow_rule(&code, rule)?;
    Ok(Json(Changed { changed }))
}

pub async fn remove_rule(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<RuleBody>,
) -> ApiResult<Json<Changed>> {
    let rule = parse_rule(&req.rule)?;
    let changed = state.remove_allow_rule(&code, &rule)?;
    Ok(Json(Changed { changed }))
}

pub async fn authorize(
    State(state): State<AppState>,
    Query(q): Query<AuthorizeQuery>,
) -> ApiResult<Json<AuthorizeResponse>> {
    let decision = state.evaluate(&q.identity, &q.server, &q.service)?;
    Ok(Json(decision.into()))
}

/// Codes of the active groups granting (server, service).
pub async fn policies(
    State(state): State<AppState>,
    Query(q): Query<PolicyQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let groups = state.groups_granting(&q.server, &q.service)?;
    Ok(Json(groups.into_iter().map(|g| g.code).collect()))
}
