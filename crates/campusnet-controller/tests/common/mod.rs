#![allow(dead_code)]

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use campusnet_controller::app_state::AppState;
use campusnet_controller::config;
use campusnet_controller::topology::{FlowProgrammer, TopologyClient};
use campusnet_core::error::{CampusNetError, EntityKind, Result};
use campusnet_core::flow::{AttachmentPoint, Hop, RuleDescriptor, RuleRef};
use campusnet_core::model::{
    AllowRule, EnrollmentGroup, GroupStatus, HardwareAddress, Identity, Server, Service,
    TransportProtocol,
};

pub const S1_MAC: &str = "aa:bb:cc:dd:ee:01";
pub const S2_MAC: &str = "aa:bb:cc:dd:ee:02";
pub const SW1: &str = "00:00:00:00:00:00:00:01";
pub const SW2: &str = "00:00:00:00:00:00:00:02";
pub const SW3: &str = "00:00:00:00:00:00:00:03";

/// In-memory topology + flow authority with switchable failures.
#[derive(Default)]
pub struct FakeNetwork {
    pub attachments: Mutex<HashMap<HardwareAddress, AttachmentPoint>>,
    pub route: Mutex<Vec<Hop>>,
    pub pushes: Mutex<Vec<RuleDescriptor>>,
    pub deletes: Mutex<Vec<RuleRef>>,
    /// Fail the push of the unicast rule at this zero-based hop index.
    pub fail_hop: Mutex<Option<usize>>,
    pub fail_broadcast: Mutex<bool>,
    pub fail_deletes: Mutex<bool>,
    pub delete_delay: Mutex<Option<Duration>>,
    pub unavailable: Mutex<bool>,
}

impl FakeNetwork {
    /// S1 on sw1/3, S2 on sw1/4, three-switch path to sw3.
    pub fn campus() -> Arc<Self> {
        let net = Self::default();
        net.attach(S1_MAC, SW1, 3);
        net.attach(S2_MAC, SW1, 4);
        *net.route.lock().unwrap() = vec![
            Hop::new(SW1, 3, 2),
            Hop::new(SW2, 1, 2),
            Hop::new(SW3, 2, 1),
        ];
        Arc::new(net)
    }

    pub fn attach(&self, mac: &str, switch: &str, port: u32) {
        self.attachments
            .lock()
            .unwrap()
            .insert(HardwareAddress::parse(mac).unwrap(), AttachmentPoint::new(switch, port));
    }

    pub fn detach(&self, mac: &str) {
        self.attachments
            .lock()
            .unwrap()
            .remove(&HardwareAddress::parse(mac).unwrap());
    }

    pub fn pushed_names(&self) -> Vec<String> {
        self.pushes.lock().unwrap().iter().map(|r| r.name.clone()).collect()
    }

    pub fn deleted_names(&self) -> Vec<String> {
        self.deletes.lock().unwrap().iter().map(|r| r.name.clone()).collect()
    }

    fn unicast_pushes(&self) -> usize {
        self.pushes
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.name.starts_with("flow_"))
            .count()
    }
}

#[async_trait]
impl TopologyClient for FakeNetwork {
    async fn attachment(&self, mac: &HardwareAddress) -> Result<AttachmentPoint> {
        if *self.unavailable.lock().unwrap() {
            return Err(CampusNetError::TopologyUnavailable("connection refused".into()));
        }
        self.attachments
            .lock()
            .unwrap()
            .get(mac)
            .cloned()
            .ok_or_else(|| CampusNetError::not_found(EntityKind::Attachment, mac.as_str()))
    }

    async fn path(&self, _src: &AttachmentPoint, _dst: &AttachmentPoint) -> Result<Vec<Hop>> {
        if *self.unavailable.lock().unwrap() {
            return Err(CampusNetError::TopologyUnavailable("connection refused".into()));
        }
        Ok(self.route.lock().unwrap().clone())
    }
}

#[async_trait]
impl FlowProgrammer for FakeNetwork {
    async fn push(&self, rule: &RuleDescriptor) -> Result<RuleRef> {
        let reject = if rule.name.starts_with("arp_flow_") {
            *self.fail_broadcast.lock().unwrap()
        } else {
            *self.fail_hop.lock().unwrap() == Some(self.unicast_pushes())
        };
        if reject {
            return Err(CampusNetError::FlowRejected {
                rule: rule.name.clone(),
                status: 500,
            });
        }
        self.pushes.lock().unwrap().push(rule.clone());
        Ok(rule.rule_ref())
    }

    async fn delete(&self, rule: &RuleRef) -> Result<()> {
        let delay = *self.delete_delay.lock().unwrap();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        if *self.fail_deletes.lock().unwrap() {
            return Err(CampusNetError::TopologyUnavailable("delete timed out".into()));
        }
        self.deletes.lock().unwrap().push(rule.clone());
        Ok(())
    }
}

pub const CONFIG: &str = r#"
version: 1
topology:
  base_url: "http://127.0.0.1:8080"
server_attachments:
  - { ip: 10.0.0.3, switch: "00:00:00:00:00:00:00:03", port: 1 }
"#;

pub fn state_with(net: &Arc<FakeNetwork>, yaml: &str) -> AppState {
    let cfg = config::load_from_str(yaml).unwrap();
    let topology: Arc<dyn TopologyClient> = net.clone();
    let flows: Arc<dyn FlowProgrammer> = net.clone();
    AppState::with_backends(cfg, topology, flows).unwrap()
}

/// Identities S1/S2, server SRV1 (web, db, dns), group G01 granting S1 SRV1:web.
pub fn seeded(net: &Arc<FakeNetwork>) -> AppState {
    let state = state_with(net, CONFIG);

    state
        .add_identity(Identity::new("Ana Torres", "S1", HardwareAddress::parse(S1_MAC).unwrap()))
        .unwrap();
    state
        .add_identity(Identity::new("Luis Perez", "S2", HardwareAddress::parse(S2_MAC).unwrap()))
        .unwrap();

    let mut srv = Server::new("SRV1", Ipv4Addr::new(10, 0, 0, 3));
    srv.add_service(Service::new("web", TransportProtocol::Tcp, 80).unwrap()).unwrap();
    srv.add_service(Service::new("db", TransportProtocol::Tcp, 5432).unwrap()).unwrap();
    srv.add_service(Service::new("dns", TransportProtocol::Udp, 53).unwrap()).unwrap();
    state.add_server(srv).unwrap();

    let mut g = EnrollmentGroup::new("G01", "Networks", GroupStatus::Active);
    g.add_member("S1");
    g.add_allow_rule(AllowRule::new("SRV1", "web"));
    state.add_group(g).unwrap();

    state
}
