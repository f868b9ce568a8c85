//! Progress views
//!
//! Route, pair and lane progress all bucket records into travelled (success),
//! in transit and pending. They differ in how a zero total is handled, see
//! [`PercentPolicy`].

use serde::Serialize;
use syncmon_model::{Stage, SyncFlag, SyncRecord, Track};
use syncmon_routing::{RouteCatalog, RouteDefinition};

/// How a percentage is computed when the total is zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentPolicy {
    /// Divide by `max(total, 1)`. Used by route and pair cards.
    UnitDenominator,
    /// 0% when the total is literally zero. Used by the two-lane view.
    ZeroWhenEmpty,
}

impl PercentPolicy {
    pub fn percent(self, count: usize, total: usize) -> f64 {
        let denominator = match self {
            PercentPolicy::UnitDenominator => total.max(1),
            PercentPolicy::ZeroWhenEmpty if total == 0 => return 0.0,
            PercentPolicy::ZeroWhenEmpty => total,
        };
        count as f64 / denominator as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub travelled: usize,
    pub in_transit: usize,
    pub pending: usize,
}

impl BucketCounts {
    pub fn total(&self) -> usize {
        self.travelled + self.in_transit + self.pending
    }

    fn add(&mut self, stage: Stage) {
        match stage {
            Stage::Success => self.travelled += 1,
            Stage::InTransit => self.in_transit += 1,
            Stage::Pending => self.pending += 1,
        }
    }

    fn collect<'a>(flags: impl IntoIterator<Item = &'a SyncFlag>) -> Self {
        let mut counts = Self::default();
        for flag in flags {
            counts.add(flag.stage);
        }
        counts
    }
}

/// Bucket counts with percentages, shared by route and pair cards
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    #[serde(flatten)]
    pub counts: BucketCounts,
    pub total: usize,
    pub travelled_pct: f64,
    pub in_transit_pct: f64,
    pub pending_pct: f64,
}

impl Progress {
    fn from_counts(counts: BucketCounts, policy: PercentPolicy) -> Self {
        let total = counts.total();
        Self {
            counts,
            total,
            travelled_pct: policy.percent(counts.travelled, total),
            in_transit_pct: policy.percent(counts.in_transit, total),
            pending_pct: policy.percent(counts.pending, total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteProgress {
    pub label: String,
    pub route: RouteDefinition,
    #[serde(flatten)]
    pub progress: Progress,
}

/// Progress of every catalog route, in catalog order.
///
/// Each record is assigned to at most one route. Records with no matching
/// route, or whose flag is not on the route's track, are left out.
pub fn route_progress(records: &[SyncRecord], catalog: &RouteCatalog) -> Vec<RouteProgress> {
    let mut counts = vec![BucketCounts::default(); catalog.len()];

    for record in records {
        let Some(index) = catalog.match_index(record) else {
            continue;
        };
        if record.flag.track == catalog.routes()[index].track {
            counts[index].add(record.flag.stage);
        }
    }

    catalog
        .routes()
        .iter()
        .zip(counts)
        .map(|(route, counts)| RouteProgress {
            label: route.label(),
            route: route.clone(),
            progress: Progress::from_counts(counts, PercentPolicy::UnitDenominator),
        })
        .collect()
}

/// Progress of all records between two nodes, any category
pub fn pair_progress(records: &[SyncRecord], source: &str, destination: &str) -> Progress {
    let counts = BucketCounts::collect(
        records
            .iter()
            .filter(|r| r.source == source && r.destination == destination)
            .map(|r| &r.flag),
    );
    Progress::from_counts(counts, PercentPolicy::UnitDenominator)
}

/// Pending / in-transit / success counts among records on one track
pub fn track_breakdown(records: &[SyncRecord], track: Track) -> BucketCounts {
    BucketCounts::collect(
        records
            .iter()
            .filter(|r| r.flag.track == track)
            .map(|r| &r.flag),
    )
}

/// One pipe of the two-lane view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneProgress {
    pub track: Track,
    pub name: &'static str,
    pub total: usize,
    pub travelled: usize,
    pub yet_to_travel: usize,
    pub travelled_pct: f64,
    pub yet_to_travel_pct: f64,
}

/// Lane view over the whole collection.
///
/// `total` is every record passed in, `travelled` those carrying this
/// track's success flag. Percentages are 0 when the collection is empty.
pub fn lane_progress(records: &[SyncRecord], track: Track) -> LaneProgress {
    let success = SyncFlag::new(track, Stage::Success);
    let total = records.len();
    let travelled = records.iter().filter(|r| r.flag == success).count();
    let yet_to_travel = total - travelled;
    let policy = PercentPolicy::ZeroWhenEmpty;

    LaneProgress {
        track,
        name: track.lane_name(),
        total,
        travelled,
        yet_to_travel,
        travelled_pct: policy.percent(travelled, total),
        yet_to_travel_pct: policy.percent(yet_to_travel, total),
    }
}

/// Both lanes, primary first
pub fn lanes(records: &[SyncRecord]) -> Vec<LaneProgress> {
    Track::ALL
        .into_iter()
        .map(|track| lane_progress(records, track))
        .collect()
}
