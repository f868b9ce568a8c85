//! Versioned record collection
//!
//! `RecordSet` is an immutable snapshot: every change produces a new set with
//! the next version number, so readers holding an older snapshot keep a
//! consistent view. Changes that alter nothing return the same version.

use std::sync::Arc;

use crate::types::SyncRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    version: u64,
    records: Arc<Vec<SyncRecord>>,
}

impl RecordSet {
    /// Initial collection at version 0
    pub fn new(records: Vec<SyncRecord>) -> Self {
        Self {
            version: 0,
            records: Arc::new(records),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn records(&self) -> &[SyncRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SyncRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Next version holding `records`
    pub(crate) fn successor(&self, records: Vec<SyncRecord>) -> Self {
        Self {
            version: self.version + 1,
            records: Arc::new(records),
        }
    }

    /// New records placed at the front, then trimmed to the `max` newest.
    ///
    /// Publishes a single successor, or returns `self` when nothing changes.
    pub fn prepend_bounded(&self, mut incoming: Vec<SyncRecord>, max: usize) -> Self {
        if incoming.is_empty() && self.records.len() <= max {
            return self.clone();
        }
        incoming.extend(self.records.iter().cloned());
        self.successor(keep_latest(incoming, max))
    }

    /// Keep only the `max` newest records by timestamp.
    ///
    /// Survivors keep their relative order.
    pub fn retain_latest(&self, max: usize) -> Self {
        if self.records.len() <= max {
            return self.clone();
        }
        self.successor(keep_latest(self.records.to_vec(), max))
    }
}

fn keep_latest(records: Vec<SyncRecord>, max: usize) -> Vec<SyncRecord> {
    if records.len() <= max {
        return records;
    }

    let mut by_age: Vec<(usize, &SyncRecord)> = records.iter().enumerate().collect();
    by_age.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp).then(a.0.cmp(&b.0)));
    let mut keep = vec![false; records.len()];
    for (idx, _) in by_age.into_iter().take(max) {
        keep[idx] = true;
    }

    records
        .into_iter()
        .zip(keep)
        .filter_map(|(r, keep)| keep.then_some(r))
        .collect()
}

impl Default for RecordSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<SyncRecord>> for RecordSet {
    fn from(records: Vec<SyncRecord>) -> Self {
        Self::new(records)
    }
}
