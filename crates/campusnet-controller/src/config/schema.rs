use std::collections::HashSet;
use std::net::{Ipv4Addr, SocketAddr};

use serde::Deserialize;

use campusnet_core::error::{CampusNetError, Result};
use campusnet_core::flow::{AttachmentPoint, DEFAULT_FORWARDING_PRIORITY};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerConfig {
    pub version: u32,

    #[serde(default)]
    pub controller: ControllerSection,

    pub topology: TopologySection,

    #[serde(default)]
    pub flows: FlowSection,

    #[serde(default)]
    pub server_attachments: Vec<ServerAttachment>,
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(CampusNetError::UnsupportedVersion);
        }

        self.controller.validate()?;
        self.topology.validate()?;
        self.flows.validate()?;

        let mut seen = HashSet::new();
        for a in &self.server_attachments {
            if !seen.insert(a.ip) {
                return Err(CampusNetError::BadRequest(format!(
                    "server_attachments: duplicate ip {}",
                    a.ip
                )));
            }
            if a.switch.trim().is_empty() {
                return Err(CampusNetError::BadRequest(format!(
                    "server_attachments: ip {} has an empty switch id",
                    a.ip
                )));
            }
            if a.port == 0 {
                return Err(CampusNetError::BadRequest(format!(
                    "server_attachments: ip {} has port 0",
                    a.ip
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Inventory document loaded at startup, if any.
    #[serde(default)]
    pub inventory: Option<String>,
}

impl Default for ControllerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            inventory: None,
        }
    }
}

impl ControllerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen.parse::<SocketAddr>().map_err(|e| {
            CampusNetError::BadRequest(format!("controller.listen must be a valid SocketAddr: {e}"))
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopologySection {
    /// e.g. `http://10.20.12.175:8080`
    pub base_url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl TopologySection {
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(CampusNetError::BadRequest(
                "topology.base_url must start with http:// or https://".into(),
            ));
        }
        if !(100..=60000).contains(&self.timeout_ms) {
            return Err(CampusNetError::BadRequest(
                "topology.timeout_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowSection {
    #[serde(default = "default_priority")]
    pub priority: u16,

    /// Delete already-programmed hops when a later hop fails.
    #[serde(default = "default_true")]
    pub rollback_partial_installs: bool,

    /// Push the ARP flood rule at the client's switch.
    #[serde(default = "default_true")]
    pub install_broadcast_rule: bool,
}

impl Default for FlowSection {
    fn default() -> Self {
        Self {
            priority: default_priority(),
            rollback_partial_installs: true,
            install_broadcast_rule: true,
        }
    }
}

impl FlowSection {
    pub fn validate(&self) -> Result<()> {
        if self.priority <= DEFAULT_FORWARDING_PRIORITY {
            return Err(CampusNetError::BadRequest(format!(
                "flows.priority must be greater than {DEFAULT_FORWARDING_PRIORITY}"
            )));
        }
        Ok(())
    }
}

/// Where a server is plugged in, keyed by its IP.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerAttachment {
    pub ip: Ipv4Addr,
    pub switch: String,
    pub port: u32,
}

impl ServerAttachment {
    pub fn attachment_point(&self) -> AttachmentPoint {
        AttachmentPoint::new(self.switch.clone(), self.port)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_timeout_ms() -> u64 {
    5000
}
fn default_priority() -> u16 {
    1000
}
fn default_true() -> bool {
    true
}
