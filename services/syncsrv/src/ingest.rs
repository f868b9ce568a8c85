//! Synthetic record producer
//!
//! Generates records on random catalog routes, created up to 12 hours in the
//! past, with stages weighted towards success. Ids are sequential from 10000.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use syncmon_model::{Stage, SyncFlag, SyncRecord, SyncRule};
use syncmon_routing::RouteCatalog;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::IngestConfig;
use crate::store::RecordStore;

pub const FIRST_RECORD_ID: u64 = 10_000;
/// Oldest generated record, in milliseconds
const MAX_AGE_MS: i64 = 12 * 3_600_000;

pub struct TrafficGenerator<R: Rng = StdRng> {
    catalog: Arc<RouteCatalog>,
    rng: R,
    next_id: u64,
}

impl TrafficGenerator<StdRng> {
    /// Seeded when `seed` is given, otherwise from OS entropy
    pub fn new(catalog: Arc<RouteCatalog>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(catalog, rng)
    }
}

impl<R: Rng> TrafficGenerator<R> {
    pub fn with_rng(catalog: Arc<RouteCatalog>, rng: R) -> Self {
        Self {
            catalog,
            rng,
            next_id: FIRST_RECORD_ID,
        }
    }

    /// 60% success, 20% in transit, 20% pending
    fn pick_stage(&mut self) -> Stage {
        let roll: f64 = self.rng.gen();
        if roll >= 0.4 {
            Stage::Success
        } else if roll >= 0.2 {
            Stage::InTransit
        } else {
            Stage::Pending
        }
    }

    /// One record on a random route; `None` only when the catalog is empty
    pub fn next_record(&mut self, now: DateTime<Utc>) -> Option<SyncRecord> {
        let catalog = Arc::clone(&self.catalog);
        let routes = catalog.routes();
        if routes.is_empty() {
            return None;
        }
        let route = &routes[self.rng.gen_range(0..routes.len())];
        let stage = self.pick_stage();
        let age = Duration::milliseconds(self.rng.gen_range(0..=MAX_AGE_MS));

        let id = self.next_id;
        self.next_id += 1;

        Some(SyncRecord::new(
            id.to_string(),
            route.source.clone(),
            route.destination.clone(),
            route.category,
            route.required_rule.unwrap_or(SyncRule::AllData),
            SyncFlag::new(route.track, stage),
            now - age,
        ))
    }

    pub fn batch(&mut self, count: usize, now: DateTime<Utc>) -> Vec<SyncRecord> {
        let mut records: Vec<SyncRecord> =
            (0..count).filter_map(|_| self.next_record(now)).collect();
        // newest first, matching the collection order
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }
}

/// Append a batch every `config.interval_secs` until `token` is cancelled
pub fn spawn_ingest_task(
    store: Arc<RecordStore>,
    mut generator: TrafficGenerator,
    config: IngestConfig,
    token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;
        info!(
            "Ingest: {} records every {}s, retaining {}",
            config.batch_size, config.interval_secs, config.max_records
        );
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Ingest stopped");
                    break;
                },
                _ = ticker.tick() => {
                    let batch = generator.batch(config.batch_size, Utc::now());
                    let report = store.ingest(batch, config.max_records);
                    debug!(
                        "Ingested {} records, evicted {} (version {})",
                        report.added, report.evicted, report.version
                    );
                },
            }
        }
    })
}
