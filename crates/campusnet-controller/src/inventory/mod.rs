//! Inventory document: YAML interchange for identities, servers and groups.
//!
//! ```yaml
//! identities:
//!   - { name: "Ana Torres", id: "S1", mac: "aa:bb:cc:dd:ee:01" }
//! servers:
//!   - name: SRV1
//!     ip: 10.0.0.3
//!     services:
//!       - { name: web, protocol: TCP, port: 80 }
//! groups:
//!   - code: G01
//!     name: Networks
//!     status: ACTIVE
//!     members: [S1]
//!     servers:
//!       - { name: SRV1, services: [web] }
//! ```
//!
//! Connections are runtime-only and never appear here.

use std::fs;

use serde::{Deserialize, Serialize};

use campusnet_core::error::{CampusNetError, Result};
use campusnet_core::model::{EnrollmentGroup, GroupStatus, Identity, Server};

use crate::policy::allowlist::{collapse_rules, expand_grants, ServerGrant};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryDocument {
    #[serde(default)]
    pub identities: Vec<Identity>,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub groups: Vec<GroupDocument>,
}

/// Group as written in the document: allow rules nested per server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupDocument {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub status: GroupStatus,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub servers: Vec<ServerGrant>,
}

impl GroupDocument {
    pub fn into_group(self) -> EnrollmentGroup {
        let mut g = EnrollmentGroup::new(self.code, self.name, self.status);
        for m in self.members {
            g.add_member(m);
        }
        for r in expand_grants(&self.servers) {
            g.add_allow_rule(r);
        }
        g
    }

    pub fn from_group(g: &EnrollmentGroup) -> Self {
        Self {
            code: g.code.clone(),
            name: g.name.clone(),
            status: g.status,
            members: g.members.iter().cloned().collect(),
            servers: collapse_rules(&g.allow_rules),
        }
    }
}

/// Counts of entries applied by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub identities: usize,
    pub servers: usize,
    pub groups: usize,
}

pub fn load_from_file(path: &str) -> Result<InventoryDocument> {
    let s = fs::read_to_string(path)
        .map_err(|e| CampusNetError::Internal(format!("read inventory failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<InventoryDocument> {
    serde_yaml::from_str(s)
        .map_err(|e| CampusNetError::BadRequest(format!("invalid inventory yaml: {e}")))
}

pub fn to_yaml_string(doc: &InventoryDocument) -> Result<String> {
    serde_yaml::to_string(doc)
        .map_err(|e| CampusNetError::Internal(format!("inventory encode failed: {e}")))
}
