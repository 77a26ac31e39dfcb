//! Enrollment groups: cohorts of identities sharing an access policy.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a group. Only ACTIVE groups grant access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupStatus {
    #[default]
    Active,
    Inactive,
}

impl GroupStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupStatus::Active => "ACTIVE",
            GroupStatus::Inactive => "INACTIVE",
        }
    }
}

/// Grants access to one service on one server.
///
/// The referenced server/service need not exist; a dangling rule never matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllowRule {
    pub server: String,
    pub service: String,
}

impl AllowRule {
    pub fn new(server: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            service: service.into(),
        }
    }

    pub fn matches(&self, server: &str, service: &str) -> bool {
        self.server == server && self.service == service
    }
}

impl fmt::Display for AllowRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.server, self.service)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnrollmentGroup {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub status: GroupStatus,
    #[serde(default)]
    pub members: BTreeSet<String>,
    #[serde(default)]
    pub allow_rules: BTreeSet<AllowRule>,
}

impl EnrollmentGroup {
    pub fn new(code: impl Into<String>, name: impl Into<String>, status: GroupStatus) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            status,
            members: BTreeSet::new(),
            allow_rules: BTreeSet::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == GroupStatus::Active
    }

    pub fn has_member(&self, identity_id: &str) -> bool {
        self.members.contains(identity_id)
    }

    /// Returns false when the member was already enrolled.
    pub fn add_member(&mut self, identity_id: impl Into<String>) -> bool {
        self.members.insert(identity_id.into())
    }

    /// Returns false when the member was not enrolled.
    pub fn remove_member(&mut self, identity_id: &str) -> bool {
        self.members.remove(identity_id)
    }

    pub fn add_allow_rule(&mut self, rule: AllowRule) -> bool {
        self.allow_rules.insert(rule)
    }

    pub fn remove_allow_rule(&mut self, rule: &AllowRule) -> bool {
        self.allow_rules.remove(rule)
    }

    /// Whether this group's rules cover (server, service), ignoring status.
    pub fn allows(&self, server: &str, service: &str) -> bool {
        self.allow_rules.iter().any(|r| r.matches(server, service))
    }
}

impl fmt::Display for EnrollmentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.code, self.name, self.status.as_str())
    }
}
