use campusnet_core::model::EnrollmentGroup;

use crate::directory::Directory;
use crate::policy::store::PolicyStore;

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    UnknownIdentity,
    UnknownServer,
    UnknownService,
    /// Everything resolved, but no active group grants the pair.
    NoGrant,
}

impl DenyReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DenyReason::UnknownIdentity => "unknown_identity",
            DenyReason::UnknownServer => "unknown_server",
            DenyReason::UnknownService => "unknown_service",
            DenyReason::NoGrant => "no_grant",
        }
    }
}

/// Decision from policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Carries the code of the first group (by code order) granting access.
    Allow { group: String },
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            AccessDecision::Allow { .. } => "allow",
            AccessDecision::Deny(r) => r.as_str(),
        }
    }
}

/// Read-only view over directory + policy state.
///
/// Union semantics: one ACTIVE group with a matching rule is enough, and
/// there are no explicit deny rules.
pub struct AuthorizationEngine<'a> {
    directory: &'a Directory,
    policy: &'a PolicyStore,
}

impl<'a> AuthorizationEngine<'a> {
    pub fn new(directory: &'a Directory, policy: &'a PolicyStore) -> Self {
        Self { directory, policy }
    }

    pub fn evaluate(&self, identity_id: &str, server: &str, service: &str) -> AccessDecision {
        if self.directory.identity(identity_id).is_err() {
            return AccessDecision::Deny(DenyReason::UnknownIdentity);
        }
        let Ok(srv) = self.directory.server(server) else {
            return AccessDecision::Deny(DenyReason::UnknownServer);
        };
        if srv.service(service).is_err() {
            return AccessDecision::Deny(DenyReason::UnknownService);
        }

        self.policy
            .active_groups_of(identity_id)
            .find(|g| g.allows(server, service))
            .map(|g| AccessDecision::Allow { group: g.code.clone() })
            .unwrap_or(AccessDecision::Deny(DenyReason::NoGrant))
    }

    pub fn is_authorized(&self, identity_id: &str, server: &str, service: &str) -> bool {
        self.evaluate(identity_id, server, service).is_allowed()
    }

    /// Active groups whose rules cover (server, service).
    pub fn groups_granting(&self, server: &str, service: &str) -> Vec<&'a EnrollmentGroup> {
        self.policy
            .groups()
            .filter(|g| g.is_active() && g.allows(server, service))
            .collect()
    }
}
