//! Exceptions
//!
//! Records still Pending on either track, newest first, with how long they
//! have been waiting and the region they are stuck in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use syncmon_model::{NodeRegistry, SyncRecord};

/// Aging above this many hours marks an exception critical
pub const CRITICAL_AGING_HOURS: f64 = 4.0;

/// Which region a stuck record is attributed to when both endpoints are regional
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionPolicy {
    /// Regional source, then regional destination, then the primary region
    #[default]
    SourceFirst,
    /// First regional node in registry order that is either endpoint
    RegistryOrder,
}

impl AttributionPolicy {
    pub fn attribute<'a>(self, record: &SyncRecord, registry: &'a NodeRegistry) -> &'a str {
        let regional = match self {
            AttributionPolicy::SourceFirst => [&record.source, &record.destination]
                .into_iter()
                .find_map(|id| registry.get(id.as_str()).filter(|n| n.is_regional())),
            AttributionPolicy::RegistryOrder => registry
                .regional()
                .find(|n| n.id == record.source || n.id == record.destination),
        };
        regional.map_or_else(|| registry.primary_region(), |n| n.region.as_str())
    }
}

impl FromStr for AttributionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "source_first" | "source" => Ok(AttributionPolicy::SourceFirst),
            "registry_order" | "registry" | "legacy" => Ok(AttributionPolicy::RegistryOrder),
            other => Err(format!("unknown attribution policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionEntry {
    pub record: SyncRecord,
    pub aging_hours: f64,
    pub critical: bool,
    pub region: String,
}

/// Pending records sorted by timestamp descending
pub fn exceptions(
    records: &[SyncRecord],
    registry: &NodeRegistry,
    now: DateTime<Utc>,
    policy: AttributionPolicy,
) -> Vec<ExceptionEntry> {
    let mut stuck: Vec<&SyncRecord> = records.iter().filter(|r| r.flag.is_pending()).collect();
    stuck.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    stuck
        .into_iter()
        .map(|record| {
            let aging_hours = record.aging_hours(now);
            ExceptionEntry {
                aging_hours,
                critical: aging_hours > CRITICAL_AGING_HOURS,
                region: policy.attribute(record, registry).to_string(),
                record: record.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use syncmon_model::{DataCategory, NodeId, SyncFlag, SyncRule};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn record(id: &str, s: &str, d: &str, flag: SyncFlag, age: Duration) -> SyncRecord {
        SyncRecord::new(
            id,
            NodeId::from(s),
            NodeId::from(d),
            DataCategory::Master,
            SyncRule::AllData,
            flag,
            now() - age,
        )
    }

    #[test]
    fn test_only_pending_records_newest_first() {
        let records = vec![
            record("old", "DM", "DS", SyncFlag::PRIMARY_PENDING, Duration::hours(6)),
            record("done", "DM", "DS", SyncFlag::PRIMARY_SUCCESS, Duration::hours(1)),
            record("new", "DM", "TS", SyncFlag::REGIONAL_PENDING, Duration::hours(1)),
            record("moving", "DM", "TS", SyncFlag::REGIONAL_IN_TRANSIT, Duration::hours(2)),
            record("mid", "TS", "DM", SyncFlag::REGIONAL_PENDING, Duration::hours(3)),
        ];
        let list = exceptions(&records, &NodeRegistry::standard(), now(), AttributionPolicy::default());

        let ids: Vec<&str> = list.iter().map(|e| e.record.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
        assert!(list[2].critical);
        assert!(!list[0].critical);
        assert!((list[1].aging_hours - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_critical_boundary() {
        let registry = NodeRegistry::standard();
        // 4.0001 h = 14400.36 s, 3.9999 h = 14399.64 s
        let just_over = record("a", "DM", "DS", SyncFlag::PRIMARY_PENDING, Duration::milliseconds(14_400_360));
        let just_under = record("b", "DM", "DS", SyncFlag::PRIMARY_PENDING, Duration::milliseconds(14_399_640));
        let exactly = record("c", "DM", "DS", SyncFlag::PRIMARY_PENDING, Duration::hours(4));

        let list = exceptions(&[just_over, just_under, exactly], &registry, now(), AttributionPolicy::SourceFirst);
        let critical = |id: &str| list.iter().find(|e| e.record.id == id).unwrap().critical;
        assert!(critical("a"));
        assert!(!critical("b"));
        assert!(!critical("c"));
    }

    #[test]
    fn test_attribution_policies() {
        let registry = NodeRegistry::standard();
        let ts_to_ks = record("1", "TS", "KS", SyncFlag::REGIONAL_PENDING, Duration::hours(1));
        let ks_to_ts = record("2", "KS", "TS", SyncFlag::REGIONAL_PENDING, Duration::hours(1));
        let dm_to_ks = record("3", "DM", "KS", SyncFlag::REGIONAL_PENDING, Duration::hours(1));
        let dm_to_ds = record("4", "DM", "DS", SyncFlag::PRIMARY_PENDING, Duration::hours(1));

        let source_first = AttributionPolicy::SourceFirst;
        let registry_order = AttributionPolicy::RegistryOrder;

        assert_eq!(source_first.attribute(&ts_to_ks, &registry), "Tanzania");
        assert_eq!(registry_order.attribute(&ts_to_ks, &registry), "Tanzania");

        assert_eq!(source_first.attribute(&ks_to_ts, &registry), "Kenya");
        assert_eq!(registry_order.attribute(&ks_to_ts, &registry), "Tanzania");

        assert_eq!(source_first.attribute(&dm_to_ks, &registry), "Kenya");
        assert_eq!(registry_order.attribute(&dm_to_ks, &registry), "Kenya");

        assert_eq!(source_first.attribute(&dm_to_ds, &registry), "Dubai");
        assert_eq!(registry_order.attribute(&dm_to_ds, &registry), "Dubai");
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("source_first".parse::<AttributionPolicy>().unwrap(), AttributionPolicy::SourceFirst);
        assert_eq!("registry-order".parse::<AttributionPolicy>().unwrap(), AttributionPolicy::RegistryOrder);
        assert!("random".parse::<AttributionPolicy>().is_err());
    }

    #[test]
    fn test_empty_collection() {
        assert!(exceptions(&[], &NodeRegistry::standard(), now(), AttributionPolicy::SourceFirst).is_empty());
    }
}
