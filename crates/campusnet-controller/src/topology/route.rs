//! Route answer -> hop list.
//!
//! The authority reports a route as a flat list of switch ports visited in
//! order: `[sw1 in, sw1 out, sw2 in, sw2 out, ...]`. Each consecutive pair on
//! the same switch is one hop.

use campusnet_core::error::{CampusNetError, Result};
use campusnet_core::flow::{AttachmentPoint, Hop};

pub fn hops_from_route(nodes: &[AttachmentPoint]) -> Result<Vec<Hop>> {
    if nodes.len() % 2 != 0 {
        return Err(CampusNetError::TopologyUnavailable(format!(
            "malformed route: odd number of switch ports ({})",
            nodes.len()
        )));
    }

    let mut hops = Vec::with_capacity(nodes.len() / 2);
    for pair in nodes.chunks_exact(2) {
        let [ingress, egress] = pair else { continue };
        if ingress.switch_id != egress.switch_id {
            return Err(CampusNetError::TopologyUnavailable(format!(
                "malformed route: port pair spans switches {} and {}",
                ingress.switch_id, egress.switch_id
            )));
        }
        hops.push(Hop::new(ingress.switch_id.clone(), ingress.port, egress.port));
    }
    Ok(hops)
}
