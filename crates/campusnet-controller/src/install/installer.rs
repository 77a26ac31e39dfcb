use std::net::Ipv4Addr;
use std::sync::Arc;

use campusnet_core::error::CampusNetError;
use campusnet_core::flow::{
    AttachmentPoint, Hop, RuleAction, RuleDescriptor, RuleMatch, RuleRef, ETH_TYPE_ARP,
    ETH_TYPE_IPV4,
};
use campusnet_core::model::{HardwareAddress, Service};

use crate::obs::metrics::ControllerMetrics;
use crate::topology::FlowProgrammer;

/// Everything needed to program one connection's path.
#[derive(Debug, Clone, Copy)]
pub struct InstallRequest<'a> {
    /// Connection sequence number; feeds rule names.
    pub seq: u64,
    pub client_mac: &'a HardwareAddress,
    pub server_ip: Ipv4Addr,
    pub service: &'a Service,
    /// Client attachment; the broadcast rule goes on this switch.
    pub source: &'a AttachmentPoint,
    pub path: &'a [Hop],
}

/// Unicast submission stopped at some hop.
///
/// `installed` holds the rules already programmed (in hop order); the
/// installer never deletes them itself.
#[derive(Debug)]
pub struct InstallFailure {
    pub installed: Vec<RuleRef>,
    pub cause: CampusNetError,
}

impl InstallFailure {
    pub fn hops_installed(&self) -> usize {
        self.installed.len()
    }
}

impl From<InstallFailure> for CampusNetError {
    fn from(f: InstallFailure) -> Self {
        CampusNetError::InstallError {
            hops_installed: f.hops_installed(),
        }
    }
}

pub fn unicast_rule_name(seq: u64, switch_id: &str) -> String {
    format!("flow_{seq}_{switch_id}")
}

pub fn broadcast_rule_name(seq: u64) -> String {
    format!("arp_flow_{seq}")
}

/// Turns resolved paths into ordered flow-rule submissions.
pub struct PathInstaller {
    flows: Arc<dyn FlowProgrammer>,
    priority: u16,
    broadcast_rule: bool,
    metrics: Arc<ControllerMetrics>,
}

impl PathInstaller {
    pub fn new(
        flows: Arc<dyn FlowProgrammer>,
        priority: u16,
        broadcast_rule: bool,
        metrics: Arc<ControllerMetrics>,
    ) -> Self {
        Self {
            flows,
            priority,
            broadcast_rule,
            metrics,
        }
    }

    /// Forwarding rule for one hop: client -> server:port out the egress port.
    pub fn unicast_rule(&self, req: &InstallRequest<'_>, hop: &Hop) -> RuleDescriptor {
        RuleDescriptor {
            switch_id: hop.switch_id.clone(),
            name: unicast_rule_name(req.seq, &hop.switch_id),
            priority: self.priority,
            active: true,
            matches: RuleMatch {
                eth_src: Some(req.client_mac.clone()),
                eth_type: ETH_TYPE_IPV4,
                ipv4_dst: Some(req.server_ip),
                transport: Some(req.service.protocol),
                dst_port: Some(req.service.port),
            },
            action: RuleAction::Output(hop.egress_port),
        }
    }

    /// ARP flood at the client's switch.
    pub fn broadcast_rule(&self, req: &InstallRequest<'_>) -> RuleDescriptor {
        RuleDescriptor {
            switch_id: req.source.switch_id.clone(),
            name: broadcast_rule_name(req.seq),
            priority: self.priority,
            active: true,
            matches: RuleMatch {
                eth_type: ETH_TYPE_ARP,
                ..RuleMatch::default()
            },
            action: RuleAction::Flood,
        }
    }

    /// Submit hop rules strictly in path order, stopping at the first failure.
    ///
    /// On success the broadcast rule is attempted as well; its failure is
    /// logged and the connection stays usable without it.
    pub async fn install(&self, req: InstallRequest<'_>) -> Result<Vec<RuleRef>, InstallFailure> {
        let mut installed = Vec::with_capacity(req.path.len() + 1);

        for hop in req.path {
            let rule = self.unicast_rule(&req, hop);
            match self.flows.push(&rule).await {
                Ok(r) => {
                    self.metrics.flow_pushes.inc(&[("kind", "unicast"), ("outcome", "ok")]);
                    tracing::debug!(seq = req.seq, switch = %hop.switch_id, rule = %rule.name, "flow rule installed");
                    installed.push(r);
                }
                Err(cause) => {
                    self.metrics.flow_pushes.inc(&[("kind", "unicast"), ("outcome", "error")]);
                    tracing::warn!(
                        seq = req.seq,
                        switch = %hop.switch_id,
                        rule = %rule.name,
                        hops_installed = installed.len(),
                        error = %cause,
                        "flow rule install failed; aborting path"
                    );
                    return Err(InstallFailure { installed, cause });
                }
            }
        }

        if self.broadcast_rule {
            let rule = self.broadcast_rule(&req);
            match self.flows.push(&rule).await {
                Ok(r) => {
                    self.metrics.flow_pushes.inc(&[("kind", "broadcast"), ("outcome", "ok")]);
                    installed.push(r);
                }
                Err(e) => {
                    self.metrics.flow_pushes.inc(&[("kind", "broadcast"), ("outcome", "error")]);
                    tracing::warn!(seq = req.seq, switch = %req.source.switch_id, error = %e, "broadcast rule install failed (non-fatal)");
                }
            }
        }

        Ok(installed)
    }
}
