//! REST client for a Floodlight-compatible SDN controller.
//!
//! Endpoints:
//! - `GET    /wm/device/?mac=<MAC>`                        device attachment
//! - `GET    /wm/routing/routes/fast/<s>/<sp>/<d>/<dp>/json` path computation
//! - `POST   /wm/staticflowpusher/json`                    install rule
//! - `DELETE /wm/staticflowpusher/json`                    remove rule by name
//!
//! Every response body is decoded into typed records here; nothing past this
//! module sees raw JSON from the authority.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use campusnet_core::error::{CampusNetError, EntityKind, Result};
use campusnet_core::flow::{AttachmentPoint, Hop, RuleAction, RuleDescriptor, RuleRef};
use campusnet_core::model::{HardwareAddress, TransportProtocol};

use crate::config::TopologySection;
use crate::topology::route::hops_from_route;
use crate::topology::{FlowProgrammer, TopologyClient};

const FLOW_PUSHER_PATH: &str = "/wm/staticflowpusher/json";

pub struct FloodlightClient {
    http: reqwest::Client,
    base_url: String,
}

impl FloodlightClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CampusNetError::Internal(format!("http client build failed: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn from_config(cfg: &TopologySection) -> Result<Self> {
        Self::new(cfg.base_url.clone(), Duration::from_millis(cfg.timeout_ms))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self.http.get(url).send().await.map_err(unavailable)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CampusNetError::TopologyUnavailable(format!(
                "GET {url} returned HTTP {status}"
            )));
        }
        resp.json::<T>().await.map_err(unavailable)
    }
}

fn unavailable(e: reqwest::Error) -> CampusNetError {
    CampusNetError::TopologyUnavailable(e.to_string())
}

// --------------------
// Response records
// --------------------

/// Ports arrive as numbers or numeric strings depending on controller version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortNumber {
    Num(u32),
    Text(String),
}

impl PortNumber {
    fn value(&self) -> Result<u32> {
        match self {
            PortNumber::Num(n) => Ok(*n),
            PortNumber::Text(s) => s.trim().parse().map_err(|_| {
                CampusNetError::TopologyUnavailable(format!("non-numeric port in response: {s}"))
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NodePort {
    switch: String,
    port: PortNumber,
}

impl NodePort {
    fn attachment_point(&self) -> Result<AttachmentPoint> {
        Ok(AttachmentPoint::new(self.switch.clone(), self.port.value()?))
    }
}

#[derive(Debug, Deserialize)]
struct DeviceRecord {
    #[serde(default)]
    mac: Vec<String>,
    #[serde(default, rename = "attachmentPoint")]
    attachment_point: Vec<NodePort>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DeviceListing {
    Bare(Vec<DeviceRecord>),
    Wrapped { devices: Vec<DeviceRecord> },
}

impl DeviceListing {
    fn into_records(self) -> Vec<DeviceRecord> {
        match self {
            DeviceListing::Bare(v) => v,
            DeviceListing::Wrapped { devices } => devices,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RouteRecord {
    route: Vec<NodePort>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RouteListing {
    Wrapped(Vec<RouteRecord>),
    Bare(Vec<NodePort>),
}

// --------------------
// Static flow entry (wire form of RuleDescriptor)
// --------------------

#[derive(Debug, Serialize)]
pub struct StaticFlowEntry<'a> {
    pub switch: &'a str,
    pub name: &'a str,
    pub cookie: &'static str,
    pub priority: String,
    pub active: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eth_src: Option<&'a str>,
    pub eth_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_dst: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_proto: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp_dst: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udp_dst: Option<String>,
    pub actions: String,
}

impl<'a> From<&'a RuleDescriptor> for StaticFlowEntry<'a> {
    fn from(rule: &'a RuleDescriptor) -> Self {
        let m = &rule.matches;
        let dst_port = |proto: TransportProtocol| match (m.transport, m.dst_port) {
            (Some(t), Some(p)) if t == proto => Some(p.to_string()),
            _ => None,
        };
        Self {
            switch: &rule.switch_id,
            name: &rule.name,
            cookie: "0",
            priority: rule.priority.to_string(),
            active: if rule.active { "true" } else { "false" },
            eth_src: m.eth_src.as_ref().map(HardwareAddress::as_str),
            eth_type: format!("0x{:04x}", m.eth_type),
            ipv4_dst: m.ipv4_dst.map(|ip| ip.to_string()),
            ip_proto: m.ip_proto().map(|p| p.to_string()),
            tcp_dst: dst_port(TransportProtocol::Tcp),
            udp_dst: dst_port(TransportProtocol::Udp),
            actions: match rule.action {
                RuleAction::Output(port) => format!("output={port}"),
                RuleAction::Flood => "output=flood".to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct DeleteEntry<'a> {
    name: &'a str,
}

// --------------------
// Trait impls
// --------------------

#[async_trait]
impl TopologyClient for FloodlightClient {
    async fn attachment(&self, mac: &HardwareAddress) -> Result<AttachmentPoint> {
        let url = self.url(&format!("/wm/device/?mac={mac}"));
        let listing: DeviceListing = self.get_json(&url).await?;

        for device in listing.into_records() {
            let matches = device
                .mac
                .iter()
                .any(|m| HardwareAddress::parse(m).map(|a| &a == mac).unwrap_or(false));
            if !matches {
                continue;
            }
            if let Some(ap) = device.attachment_point.first() {
                return ap.attachment_point();
            }
        }

        Err(CampusNetError::not_found(EntityKind::Attachment, mac.as_str()))
    }

    async fn path(&self, src: &AttachmentPoint, dst: &AttachmentPoint) -> Result<Vec<Hop>> {
        let url = self.url(&format!(
            "/wm/routing/routes/fast/{}/{}/{}/{}/json",
            src.switch_id, src.port, dst.switch_id, dst.port
        ));
        let listing: RouteListing = self.get_json(&url).await?;

        let nodes = match listing {
            RouteListing::Wrapped(records) => match records.into_iter().next() {
                Some(r) => r.route,
                None => return Ok(Vec::new()),
            },
            RouteListing::Bare(nodes) => nodes,
        };

        let points = nodes
            .iter()
            .map(NodePort::attachment_point)
            .collect::<Result<Vec<_>>>()?;
        hops_from_route(&points)
    }
}

#[async_trait]
impl FlowProgrammer for FloodlightClient {
    async fn push(&self, rule: &RuleDescriptor) -> Result<RuleRef> {
        let entry = StaticFlowEntry::from(rule);
        let resp = self
            .http
            .post(self.url(FLOW_PUSHER_PATH))
            .json(&entry)
            .send()
            .await
            .map_err(unavailable)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CampusNetError::FlowRejected {
                rule: rule.name.clone(),
                status: status.as_u16(),
            });
        }
        Ok(rule.rule_ref())
    }

    async fn delete(&self, rule: &RuleRef) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(FLOW_PUSHER_PATH))
            .json(&DeleteEntry { name: &rule.name })
            .send()
            .await
            .map_err(unavailable)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CampusNetError::FlowRejected {
                rule: rule.name.clone(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
