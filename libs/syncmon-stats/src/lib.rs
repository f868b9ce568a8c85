//! SyncMonitor Statistics Library
//!
//! Pure aggregation over a slice of records. Nothing here mutates records or
//! performs IO; every function is deterministic given its inputs and `now`.
//!
//! - `kpi`: global counts and success rate
//! - `progress`: route, pair and lane progress plus per-track breakdown
//! - `nodes`: per-node outbound / inbound summary
//! - `exceptions`: pending records with aging and region attribution
//! - `dashboard`: all of the above from one snapshot

pub mod dashboard;
pub mod exceptions;
pub mod kpi;
pub mod nodes;
pub mod progress;

pub use dashboard::{DashboardContext, DashboardView};
pub use exceptions::{exceptions, AttributionPolicy, ExceptionEntry, CRITICAL_AGING_HOURS};
pub use kpi::{compute_kpis, GlobalKpis};
pub use nodes::{node_summaries, NodeSummary};
pub use progress::{
    lane_progress, lanes, pair_progress, route_progress, track_breakdown, BucketCounts,
    LaneProgress, PercentPolicy, Progress, RouteProgress,
};
