use std::fmt;

use serde::{Deserialize, Serialize};

/// Switch and port a device is currently bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttachmentPoint {
    /// Datapath id, e.g. `00:00:00:00:00:00:00:01`.
    pub switch_id: String,
    pub port: u32,
}

impl AttachmentPoint {
    pub fn new(switch_id: impl Into<String>, port: u32) -> Self {
        Self {
            switch_id: switch_id.into(),
            port,
        }
    }
}

impl fmt::Display for AttachmentPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.switch_id, self.port)
    }
}

/// One switch traversal of a computed path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    pub switch_id: String,
    pub ingress_port: u32,
    pub egress_port: u32,
}

impl Hop {
    pub fn new(switch_id: impl Into<String>, ingress_port: u32, egress_port: u32) -> Self {
        Self {
            switch_id: switch_id.into(),
            ingress_port,
            egress_port,
        }
    }
}
