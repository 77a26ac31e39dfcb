//! Topology and flow-programming boundary.
//!
//! Both authorities are external and reachable only through fallible
//! request/response calls. Implementations must bound every call by a
//! timeout and report transport failures as `TopologyUnavailable`; retry
//! policy belongs to callers.

pub mod floodlight;
pub mod route;

use std::collections::HashMap;
use std::net::Ipv4Addr;

use async_trait::async_trait;

use campusnet_core::error::Result;
use campusnet_core::flow::{AttachmentPoint, Hop, RuleDescriptor, RuleRef};
use campusnet_core::model::HardwareAddress;

use crate::config::ServerAttachment;

pub use floodlight::FloodlightClient;

/// Device location and path computation.
#[async_trait]
pub trait TopologyClient: Send + Sync {
    /// Where a device is currently bound. `NotFound` when the authority has
    /// no attachment for the address.
    async fn attachment(&self, mac: &HardwareAddress) -> Result<AttachmentPoint>;

    /// Ordered hops from `src` to `dst`. An empty vector means no route.
    async fn path(&self, src: &AttachmentPoint, dst: &AttachmentPoint) -> Result<Vec<Hop>>;
}

/// Static flow rule installation.
#[async_trait]
pub trait FlowProgrammer: Send + Sync {
    async fn push(&self, rule: &RuleDescriptor) -> Result<RuleRef>;
    async fn delete(&self, rule: &RuleRef) -> Result<()>;
}

/// Server IP -> attachment point, from config.
#[derive(Debug, Clone, Default)]
pub struct ServerAttachments {
    by_ip: HashMap<Ipv4Addr, AttachmentPoint>,
}

impl ServerAttachments {
    pub fn from_config(entries: &[ServerAttachment]) -> Self {
        let by_ip = entries
            .iter()
            .map(|e| (e.ip, e.attachment_point()))
            .collect();
        Self { by_ip }
    }

    pub fn get(&self, ip: &Ipv4Addr) -> Option<&AttachmentPoint> {
        self.by_ip.get(ip)
    }

    pub fn len(&self) -> usize {
        self.by_ip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ip.is_empty()
    }
}
