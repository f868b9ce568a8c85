//! Global KPIs

use serde::Serialize;
use syncmon_model::{NodeRegistry, Stage, SyncRecord, Track};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GlobalKpis {
    pub total: usize,
    pub pending_primary: usize,
    pub pending_regional: usize,
    pub in_transit: usize,
    pub success: usize,
    /// round(success / total * 100), 0 for an empty collection
    pub success_rate: u32,
    pub active_nodes: usize,
    pub total_nodes: usize,
}

pub fn compute_kpis(records: &[SyncRecord], registry: &NodeRegistry) -> GlobalKpis {
    let mut kpis = GlobalKpis {
        total: records.len(),
        active_nodes: registry.active_count(),
        total_nodes: registry.len(),
        ..GlobalKpis::default()
    };

    for record in records {
        match (record.flag.track, record.flag.stage) {
            (Track::Primary, Stage::Pending) => kpis.pending_primary += 1,
            (Track::Regional, Stage::Pending) => kpis.pending_regional += 1,
            (_, Stage::InTransit) => kpis.in_transit += 1,
            (_, Stage::Success) => kpis.success += 1,
        }
    }

    kpis.success_rate = success_rate(kpis.success, kpis.total);
    kpis
}

/// Integer percentage rounded half up
fn success_rate(success: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((success * 200 + total) / (total * 2)) as u32
}
