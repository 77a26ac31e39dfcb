//! Axum router wiring for the admin API and ops endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{api, app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        // directory
        .route(
            "/v1/identities",
            get(api::directory::list_identities).post(api::directory::create_identity),
        )
        .route(
            "/v1/identities/:id",
            get(api::directory::get_identity).delete(api::directory::delete_identity),
        )
        .route(
            "/v1/servers",
            get(api::directory::list_servers).post(api::directory::create_server),
        )
        .route(
            "/v1/servers/:name",
            get(api::directory::get_server).delete(api::directory::delete_server),
        )
        .route("/v1/servers/:name/services", post(api::directory::add_service))
        .route(
            "/v1/servers/:name/services/:service",
            get(api::directory::get_service),
        )
        // policy
        .route(
            "/v1/groups",
            get(api::groups::list_groups).post(api::groups::create_group),
        )
        .route(
            "/v1/groups/:code",
            get(api::groups::get_group).delete(api::groups::delete_group),
        )
        .route("/v1/groups/:code/status", put(api::groups::set_status))
        .route("/v1/groups/:code/members", get(api::groups::list_members))
        .route(
            "/v1/groups/:code/members/:id",
            put(api::groups::add_member).delete(api::groups::remove_member),
        )
        .route(
            "/v1/groups/:code/rules",
            post(api::groups::add_rule).delete(api::groups::remove_rule),
        )
        .route("/v1/authorize", get(api::groups::authorize))
        .route("/v1/policies", get(api::groups::policies))
        // connections
        .route(
            "/v1/connections",
            get(api::connections::list).post(api::connections::create),
        )
        .route(
            "/v1/connections/:handler",
            get(api::connections::get).delete(api::connections::remove),
        )
        // inventory
        .route(
            "/v1/inventory",
            get(api::inventory::export).put(api::inventory::import),
        )
        .with_state(state)
}
