//! Shared error type across campusnet crates.

use std::fmt;

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request.
    BadRequest,
    /// Lookup miss.
    NotFound,
    /// Authorization said no.
    Denied,
    /// Topology or flow authority unreachable.
    TopologyUnavailable,
    /// Authority reachable but no path between the endpoints.
    NoRouteFound,
    /// Flow rules could not be programmed.
    InstallFailed,
    /// Key or service name already taken.
    Conflict,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::Denied => "DENIED",
            ClientCode::TopologyUnavailable => "TOPOLOGY_UNAVAILABLE",
            ClientCode::NoRouteFound => "NO_ROUTE_FOUND",
            ClientCode::InstallFailed => "INSTALL_FAILED",
            ClientCode::Conflict => "CONFLICT",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Kind of entity named in `NotFound` / `DuplicateKey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Identity,
    Server,
    Service,
    Group,
    Connection,
    Attachment,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Identity => "identity",
            EntityKind::Server => "server",
            EntityKind::Service => "service",
            EntityKind::Group => "group",
            EntityKind::Connection => "connection",
            EntityKind::Attachment => "attachment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, CampusNetError>;

/// Unified error type used by core and controller.
#[derive(Debug, Error)]
pub enum CampusNetError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("{kind} not found: {key}")]
    NotFound { kind: EntityKind, key: String },
    #[error("access denied")]
    Denied,
    #[error("topology authority unavailable: {0}")]
    TopologyUnavailable(String),
    #[error("no route found")]
    NoRouteFound,
    #[error("flow installation failed after {hops_installed} hop(s)")]
    InstallError { hops_installed: usize },
    #[error("flow authority rejected rule {rule} (status {status})")]
    FlowRejected { rule: String, status: u16 },
    #[error("service {service} already exists on server {server}")]
    DuplicateService { server: String, service: String },
    #[error("{kind} already exists: {key}")]
    DuplicateKey { kind: EntityKind, key: String },
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl CampusNetError {
    pub fn not_found(kind: EntityKind, key: impl Into<String>) -> Self {
        CampusNetError::NotFound { kind, key: key.into() }
    }

    pub fn duplicate(kind: EntityKind, key: impl Into<String>) -> Self {
        CampusNetError::DuplicateKey { kind, key: key.into() }
    }

    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            CampusNetError::BadRequest(_) => ClientCode::BadRequest,
            CampusNetError::NotFound { .. } => ClientCode::NotFound,
            CampusNetError::Denied => ClientCode::Denied,
            CampusNetError::TopologyUnavailable(_) => ClientCode::TopologyUnavailable,
            CampusNetError::NoRouteFound => ClientCode::NoRouteFound,
            CampusNetError::InstallError { .. } | CampusNetError::FlowRejected { .. } => {
                ClientCode::InstallFailed
            }
            CampusNetError::DuplicateService { .. } | CampusNetError::DuplicateKey { .. } => {
                ClientCode::Conflict
            }
            CampusNetError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            CampusNetError::Internal(_) => ClientCode::Internal,
        }
    }
}
