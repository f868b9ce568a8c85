//! Cached health insight
//!
//! The dashboard never waits on the advisory service. A background task asks
//! the advisor whenever the record count has changed and the last answer is
//! kept here for readers.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::advisory::{Advice, HealthInsight, HealthSummary};
use crate::app_state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct CachedInsight {
    #[serde(flatten)]
    pub advice: Advice<HealthInsight>,
    /// Record count the insight was computed from
    pub record_count: usize,
    pub collection_version: u64,
}

#[derive(Default)]
pub struct InsightCache {
    current: ArcSwapOption<CachedInsight>,
}

impl InsightCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<CachedInsight>> {
        self.current.load_full()
    }

    fn store(&self, insight: CachedInsight) -> Arc<CachedInsight> {
        let insight = Arc::new(insight);
        self.current.store(Some(Arc::clone(&insight)));
        insight
    }

    /// True when nothing is cached yet or the cached insight was computed
    /// from a different number of records
    pub fn is_stale(&self, record_count: usize) -> bool {
        self.current
            .load()
            .as_ref()
            .map_or(true, |cached| cached.record_count != record_count)
    }
}

/// Ask the advisor about the current snapshot and cache the answer
pub async fn refresh_insight(state: &AppState) -> Arc<CachedInsight> {
    let snapshot = state.records.snapshot();
    let registry = state.nodes();
    let summary = HealthSummary::from_records(snapshot.records(), &registry);

    let advice = state.advisor.analyze_health(&summary).await;
    debug!(
        "Health insight refreshed for {} records (fallback: {})",
        summary.total, advice.fallback
    );

    state.insight.store(CachedInsight {
        advice,
        record_count: snapshot.len(),
        collection_version: snapshot.version(),
    })
}

/// Refresh the cached insight every `interval` when the record count changed
pub fn spawn_insight_refresher(
    state: Arc<AppState>,
    interval: Duration,
    token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Insight refresher stopped");
                    break;
                },
                _ = ticker.tick() => {
                    if state.insight.is_stale(state.records.len()) {
                        refresh_insight(&state).await;
                    }
                },
            }
        }
    })
}
