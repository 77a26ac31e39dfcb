use std::net::Ipv4Addr;

use serde::Serialize;

use crate::flow::RuleRef;
use crate::model::{HardwareAddress, TransportProtocol};

/// An authorized client→service session with its programmed rules.
///
/// Runtime-only: connections are never part of the inventory document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub handler: String,
    pub client_mac: HardwareAddress,
    pub server_ip: Ipv4Addr,
    pub service_name: String,
    pub protocol: TransportProtocol,
    pub port: u16,
    pub installed_rules: Vec<RuleRef>,
}

impl Connection {
    pub fn key(&self) -> ConnectionKey {
        ConnectionKey {
            client_mac: self.client_mac.clone(),
            server_ip: self.server_ip,
            service_name: self.service_name.clone(),
            protocol: self.protocol,
            port: self.port,
        }
    }
}

/// Identity of a connection request for de-duplication and serialization.
///
/// Protocol and port are part of it: two servers may share an IP and each
/// name a service the same way on different ports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    pub client_mac: HardwareAddress,
    pub server_ip: Ipv4Addr,
    pub service_name: String,
    pub protocol: TransportProtocol,
    pub port: u16,
}
