//! HTTP mapping for `CampusNetError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use campusnet_core::error::{CampusNetError, ClientCode};

/// Handler error wrapper; every handler returns `Result<_, ApiError>`.
#[derive(Debug)]
pub struct ApiError(pub CampusNetError);

impl From<CampusNetError> for ApiError {
    fn from(e: CampusNetError) -> Self {
        ApiError(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest | ClientCode::UnsupportedVersion => StatusCode::BAD_REQUEST,
        ClientCode::NotFound => StatusCode::NOT_FOUND,
        ClientCode::Denied => StatusCode::FORBIDDEN,
        ClientCode::TopologyUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ClientCode::NoRouteFound | ClientCode::InstallFailed => StatusCode::BAD_GATEWAY,
        ClientCode::Conflict => StatusCode::CONFLICT,
        ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = status_for(code);
        if status.is_server_error() {
            tracing::warn!(error = %self.0, code = code.as_str(), "request failed");
        } else {
            tracing::debug!(error = %self.0, code = code.as_str(), "request rejected");
        }
        let body = ErrorBody {
            error: code.as_str(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
