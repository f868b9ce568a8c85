//! Dashboard bundle: every view computed from one snapshot

use chrono::{DateTime, Utc};
use serde::Serialize;
use syncmon_model::{NodeRegistry, RecordFilter, RecordSet};
use syncmon_routing::RouteCatalog;

use crate::exceptions::{exceptions, AttributionPolicy, ExceptionEntry};
use crate::kpi::{compute_kpis, GlobalKpis};
use crate::nodes::{node_summaries, NodeSummary};
use crate::progress::{lanes, route_progress, LaneProgress, RouteProgress};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Version of the collection the view was computed from
    pub version: u64,
    pub generated_at: DateTime<Utc>,
    pub filter: RecordFilter,
    pub attribution: AttributionPolicy,
    pub kpis: GlobalKpis,
    pub lanes: Vec<LaneProgress>,
    pub routes: Vec<RouteProgress>,
    pub nodes: Vec<NodeSummary>,
    pub exceptions: Vec<ExceptionEntry>,
    pub critical_exceptions: usize,
}

/// Inputs shared by every view
pub struct DashboardContext<'a> {
    pub registry: &'a NodeRegistry,
    pub catalog: &'a RouteCatalog,
    pub attribution: AttributionPolicy,
    pub now: DateTime<Utc>,
}

impl DashboardView {
    pub fn compute(set: &RecordSet, filter: RecordFilter, ctx: &DashboardContext<'_>) -> Self {
        let records = filter.apply(set.records());
        let exceptions = exceptions(&records, ctx.registry, ctx.now, ctx.attribution);
        let critical_exceptions = exceptions.iter().filter(|e| e.critical).count();

        Self {
            version: set.version(),
            generated_at: ctx.now,
            filter,
            attribution: ctx.attribution,
            kpis: compute_kpis(&records, ctx.registry),
            lanes: lanes(&records),
            routes: route_progress(&records, ctx.catalog),
            nodes: node_summaries(&records, ctx.registry),
            exceptions,
            critical_exceptions,
        }
    }
}
