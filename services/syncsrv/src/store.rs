//! Versioned record collection
//!
//! Readers load an `Arc<RecordSet>` snapshot without locking. Writers are
//! serialized by `write_lock` and publish a whole new version, so a reader
//! never observes a partially applied change.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use syncmon_model::{force_sync_with_outcome, ForceSyncOutcome, RecordSet, SyncRecord};
use tracing::{debug, info};

pub struct RecordStore {
    current: ArcSwap<RecordSet>,
    write_lock: Mutex<()>,
}

/// Result of one ingestion step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub added: usize,
    pub evicted: usize,
    pub version: u64,
}

impl RecordStore {
    pub fn new(initial: RecordSet) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
            write_lock: Mutex::new(()),
        }
    }

    /// Consistent view of the current version
    pub fn snapshot(&self) -> Arc<RecordSet> {
        self.current.load_full()
    }

    pub fn version(&self) -> u64 {
        self.current.load().version()
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    /// Apply the force-sync transition to `id`.
    ///
    /// A new version is published only when the record actually advanced.
    pub fn force_sync(&self, id: &str, now: DateTime<Utc>) -> (u64, ForceSyncOutcome) {
        let _guard = self.write_lock.lock();
        let current = self.current.load_full();
        let (next, outcome) = force_sync_with_outcome(&current, id, now);

        if outcome.changed() {
            let version = next.version();
            self.current.store(Arc::new(next));
            info!("Force sync {}: {:?} (version {})", id, outcome, version);
            (version, outcome)
        } else {
            debug!("Force sync {}: {:?}", id, outcome);
            (current.version(), outcome)
        }
    }

    /// Prepend a batch of new records and trim to the newest `max_records`
    pub fn ingest(&self, batch: Vec<SyncRecord>, max_records: usize) -> IngestReport {
        let _guard = self.write_lock.lock();
        let current = self.current.load_full();
        let added = batch.len();
        let before = current.len() + added;

        let next = current.prepend_bounded(batch, max_records);
        let evicted = before - next.len();
        let version = next.version();
        if next.version() != current.version() {
            self.current.store(Arc::new(next));
        }

        IngestReport {
            added,
            evicted,
            version,
        }
    }
}
