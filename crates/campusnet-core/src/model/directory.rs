//! Directory entities: client identities and servers exposing services.

use std::collections::HashSet;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CampusNetError, EntityKind, Result};
use crate::model::HardwareAddress;

/// A known client device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Identity {
    #[serde(rename = "name")]
    pub display_name: String,
    pub id: String,
    #[serde(rename = "mac")]
    pub hardware_address: HardwareAddress,
}

impl Identity {
    pub fn new(
        display_name: impl Into<String>,
        id: impl Into<String>,
        hardware_address: HardwareAddress,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            id: id.into(),
            hardware_address,
        }
    }
}

/// Transport protocol of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TransportProtocol {
    Tcp,
    Udp,
}

impl TransportProtocol {
    /// IP protocol number carried in the IPv4 header.
    pub fn ip_proto(self) -> u8 {
        match self {
            TransportProtocol::Tcp => 6,
            TransportProtocol::Udp => 17,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportProtocol::Tcp => "TCP",
            TransportProtocol::Udp => "UDP",
        }
    }
}

impl FromStr for TransportProtocol {
    type Err = CampusNetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TCP" => Ok(TransportProtocol::Tcp),
            "UDP" => Ok(TransportProtocol::Udp),
            other => Err(CampusNetError::BadRequest(format!(
                "unsupported transport protocol: {other} (expected TCP or UDP)"
            ))),
        }
    }
}

impl TryFrom<String> for TransportProtocol {
    type Error = CampusNetError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<TransportProtocol> for String {
    fn from(p: TransportProtocol) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named service on a server. Port 0 is rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawService")]
pub struct Service {
    pub name: String,
    pub protocol: TransportProtocol,
    pub port: u16,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawService {
    name: String,
    protocol: TransportProtocol,
    port: u16,
}

impl TryFrom<RawService> for Service {
    type Error = CampusNetError;

    fn try_from(raw: RawService) -> Result<Self> {
        Service::new(raw.name, raw.protocol, raw.port)
    }
}

impl Service {
    pub fn new(name: impl Into<String>, protocol: TransportProtocol, port: u16) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CampusNetError::BadRequest("service name must not be empty".into()));
        }
        if port == 0 {
            return Err(CampusNetError::BadRequest(format!(
                "service {name}: port must be between 1 and 65535"
            )));
        }
        Ok(Self { name, protocol, port })
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.protocol, self.port)
    }
}

/// A server reachable through the campus network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Server {
    pub name: String,
    pub ip: Ipv4Addr,
    /// Lets the topology authority locate the server when no static
    /// attachment is configured for its IP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<HardwareAddress>,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl Server {
    pub fn new(name: impl Into<String>, ip: Ipv4Addr) -> Self {
        Self {
            name: name.into(),
            ip,
            mac: None,
            services: Vec::new(),
        }
    }

    pub fn with_mac(mut self, mac: HardwareAddress) -> Self {
        self.mac = Some(mac);
        self
    }

    /// Look up a service by name.
    pub fn service(&self, name: &str) -> Result<&Service> {
        self.services
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| CampusNetError::not_found(EntityKind::Service, format!("{}/{name}", self.name)))
    }

    pub fn add_service(&mut self, service: Service) -> Result<()> {
        if self.services.iter().any(|s| s.name == service.name) {
            return Err(CampusNetError::DuplicateService {
                server: self.name.clone(),
                service: service.name,
            });
        }
        self.services.push(service);
        Ok(())
    }

    /// Reject empty names and service names that collide within this server.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CampusNetError::BadRequest("server name must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for s in &self.services {
            if !seen.insert(s.name.as_str()) {
                return Err(CampusNetError::DuplicateService {
                    server: self.name.clone(),
                    service: s.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ip)
    }
}
