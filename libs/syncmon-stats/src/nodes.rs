//! Per-node summary

use serde::Serialize;
use syncmon_model::{NodeId, NodeRegistry, NodeStatus, Stage, SyncRecord, Track};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSummary {
    pub id: NodeId,
    pub name: String,
    pub address: String,
    pub status: NodeStatus,
    pub track: Track,
    pub region: String,
    /// Pending records this node has yet to send
    pub outbound_pending: usize,
    pub outbound_in_transit: usize,
    /// Records delivered to this node
    pub inbound_received: usize,
}

/// One summary per registered node, in registry order. Counts span both tracks.
pub fn node_summaries(records: &[SyncRecord], registry: &NodeRegistry) -> Vec<NodeSummary> {
    registry
        .iter()
        .map(|node| {
            let mut summary = NodeSummary {
                id: node.id.clone(),
                name: node.name.clone(),
                address: node.address.clone(),
                status: node.status,
                track: node.track,
                region: node.region.clone(),
                outbound_pending: 0,
                outbound_in_transit: 0,
                inbound_received: 0,
            };
            for record in records {
                if record.source == node.id {
                    match record.flag.stage {
                        Stage::Pending => summary.outbound_pending += 1,
                        Stage::InTransit => summary.outbound_in_transit += 1,
                        Stage::Success => {}
                    }
                }
                if record.destination == node.id && record.flag.is_success() {
                    summary.inbound_received += 1;
                }
            }
            summary
        })
        .collect()
}
