//! Allow-rule parsing and the per-server grant form used by the inventory.
//!
//! Two spellings exist for the same rule set:
//! - compact `server:service` strings (API paths)
//! - nested `{ name, services: [...] }` blocks (inventory documents)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use campusnet_core::error::{CampusNetError, Result};
use campusnet_core::model::AllowRule;

/// Services a group may reach on one server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerGrant {
    pub name: String,
    #[serde(default)]
    pub services: Vec<String>,
}

pub fn parse_rule(s: &str) -> Result<AllowRule> {
    // format: "server:service"
    let (server, service) = s.split_once(':').ok_or_else(|| {
        CampusNetError::BadRequest(format!("invalid allow rule: {s} (expected server:service)"))
    })?;
    if server.is_empty() || service.is_empty() {
        return Err(CampusNetError::BadRequest(format!(
            "invalid allow rule: {s} (server and service must be non-empty)"
        )));
    }
    Ok(AllowRule::new(server, service))
}

pub fn expand_grants(grants: &[ServerGrant]) -> Vec<AllowRule> {
    let mut out = Vec::new();
    for g in grants {
        for svc in &g.services {
            out.push(AllowRule::new(g.name.clone(), svc.clone()));
        }
    }
    out
}

/// Inverse of `expand_grants`, grouped by server name.
pub fn collapse_rules<'a>(rules: impl IntoIterator<Item = &'a AllowRule>) -> Vec<ServerGrant> {
    let mut by_server: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for r in rules {
        by_server
            .entry(r.server.as_str())
            .or_default()
            .push(r.service.clone());
    }
    by_server
        .into_iter()
        .map(|(name, services)| ServerGrant {
            name: name.to_string(),
            services,
        })
        .collect()
}
