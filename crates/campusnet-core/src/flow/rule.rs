//! Match/action flow rules.

use std::net::Ipv4Addr;

use serde::Serialize;

use crate::model::{HardwareAddress, TransportProtocol};

/// EtherType for IPv4 payloads.
pub const ETH_TYPE_IPV4: u16 = 0x0800;
/// EtherType for ARP.
pub const ETH_TYPE_ARP: u16 = 0x0806;
/// Priority used by the authority's reactive forwarding; connection rules
/// must sit strictly above it.
pub const DEFAULT_FORWARDING_PRIORITY: u16 = 1;

/// Header fields a rule matches on. `None` means wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RuleMatch {
    pub eth_src: Option<HardwareAddress>,
    pub eth_type: u16,
    pub ipv4_dst: Option<Ipv4Addr>,
    /// Selects `ip_proto` and which transport port field `dst_port` binds to.
    pub transport: Option<TransportProtocol>,
    pub dst_port: Option<u16>,
}

impl RuleMatch {
    pub fn ip_proto(&self) -> Option<u8> {
        self.transport.map(TransportProtocol::ip_proto)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RuleAction {
    /// Forward out a specific port.
    Output(u32),
    /// Flood out every port except ingress.
    Flood,
}

/// A flow rule ready to be submitted to one switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDescriptor {
    pub switch_id: String,
    pub name: String,
    pub priority: u16,
    pub active: bool,
    pub matches: RuleMatch,
    pub action: RuleAction,
}

impl RuleDescriptor {
    pub fn rule_ref(&self) -> RuleRef {
        RuleRef {
            switch_id: self.switch_id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Handle to an installed rule, sufficient to delete it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RuleRef {
    pub switch_id: String,
    pub name: String,
}
