//! Force-sync transition
//!
//! The single operator action on records: push a Pending record to
//! InTransit on the same track. Anything else is a no-op, which makes the
//! action idempotent.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::collection::RecordSet;
use crate::types::SyncFlag;

/// What a force sync did to the targeted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ForceSyncOutcome {
    Advanced { from: SyncFlag, to: SyncFlag },
    /// Record exists but is not Pending
    Unchanged { flag: SyncFlag },
    NotFound,
}

impl ForceSyncOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, ForceSyncOutcome::Advanced { .. })
    }
}

/// Apply the transition and return the resulting collection.
///
/// Unknown ids and non-pending records leave the collection (and its
/// version) unchanged.
pub fn force_sync(records: &RecordSet, id: &str, now: DateTime<Utc>) -> RecordSet {
    force_sync_with_outcome(records, id, now).0
}

/// Like [`force_sync`] but also reports what happened
pub fn force_sync_with_outcome(
    records: &RecordSet,
    id: &str,
    now: DateTime<Utc>,
) -> (RecordSet, ForceSyncOutcome) {
    let Some(position) = records.records().iter().position(|r| r.id == id) else {
        debug!("Force sync ignored, record {} not found", id);
        return (records.clone(), ForceSyncOutcome::NotFound);
    };

    let current = records.records()[position].flag;
    let Some(next) = current.advanced() else {
        debug!("Force sync ignored, record {} already {}", id, current);
        return (records.clone(), ForceSyncOutcome::Unchanged { flag: current });
    };

    let mut updated = records.records().to_vec();
    let target = &mut updated[position];
    target.flag = next;
    target.last_modified = now;

    (
        records.successor(updated),
        ForceSyncOutcome::Advanced {
            from: current,
            to: next,
        },
    )
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::types::{DataCategory, NodeId, SyncRecord, SyncRule};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn record(id: &str, flag: SyncFlag) -> SyncRecord {
        let destination = if flag.track == crate::Track::Primary { "DS" } else { "TS" };
        SyncRecord::new(
            id,
            NodeId::from("DM"),
            NodeId::from(destination),
            DataCategory::Transaction,
            SyncRule::AllData,
            flag,
            t0() - Duration::hours(5),
        )
    }

    fn sample() -> RecordSet {
        RecordSet::new(vec![
            record("p1", SyncFlag::PRIMARY_PENDING),
            record("r1", SyncFlag::REGIONAL_PENDING),
            record("p2", SyncFlag::PRIMARY_IN_TRANSIT),
            record("r2", SyncFlag::REGIONAL_SUCCESS),
        ])
    }

    #[test]
    fn test_pending_advances_on_same_track() {
        let set = sample();
        let now = t0();

        let (next, outcome) = force_sync_with_outcome(&set, "p1", now);
        assert_eq!(
            outcome,
            ForceSyncOutcome::Advanced {
                from: SyncFlag::PRIMARY_PENDING,
                to: SyncFlag::PRIMARY_IN_TRANSIT
            }
        );
        assert_eq!(next.get("p1").unwrap().flag, SyncFlag::PRIMARY_IN_TRANSIT);
        assert_eq!(next.get("p1").unwrap().last_modified, now);
        assert_eq!(next.version(), set.version() + 1);

        let next = force_sync(&set, "r1", now);
        assert_eq!(next.get("r1").unwrap().flag, SyncFlag::REGIONAL_IN_TRANSIT);
    }

    #[test]
    fn test_only_target_changes() {
        let set = sample();
        let next = force_sync(&set, "p1", t0());

        for (before, after) in set.records().iter().zip(next.records()) {
            if before.id == "p1" {
                assert_eq!(after.id, before.id);
                assert_eq!(after.source, before.source);
                assert_eq!(after.destination, before.destination);
                assert_eq!(after.category, before.category);
                assert_eq!(after.rule, before.rule);
                assert_eq!(after.timestamp, before.timestamp);
            } else {
                assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn test_non_pending_is_noop() {
        let set = sample();
        for id in ["p2", "r2"] {
            let (next, outcome) = force_sync_with_outcome(&set, id, t0());
            assert!(!outcome.changed());
            assert_eq!(next, set);
        }
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let set = sample();
        let (next, outcome) = force_sync_with_outcome(&set, "missing", t0());
        assert_eq!(outcome, ForceSyncOutcome::NotFound);
        assert_eq!(next, set);
    }

    #[test]
    fn test_idempotent_and_last_modified_set_once() {
        let set = sample();
        let first_at = t0();
        let once = force_sync(&set, "p1", first_at);
        let twice = force_sync(&once, "p1", first_at + Duration::minutes(10));

        assert_eq!(once, twice);
        assert_eq!(twice.get("p1").unwrap().last_modified, first_at);
    }

    #[test]
    fn test_outcome_json_shape() {
        let json = serde_json::to_value(ForceSyncOutcome::Advanced {
            from: SyncFlag::REGIONAL_PENDING,
            to: SyncFlag::REGIONAL_IN_TRANSIT,
        })
        .unwrap();
        assert_eq!(json["outcome"], "advanced");
        assert_eq!(json["from"], "UN");
        assert_eq!(json["to"], "US");

        let json = serde_json::to_value(ForceSyncOutcome::NotFound).unwrap();
        assert_eq!(json["outcome"], "not_found");
    }
}
