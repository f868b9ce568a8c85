//! Application State Management
//!
//! Central state shared by every API handler and background task

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use syncmon_model::{ModelError, NodeRegistry, RecordSet, ServerNode};
use syncmon_routing::RouteCatalog;
use tracing::info;

use crate::advisory::Advisor;
use crate::config::SyncsrvConfig;
use crate::error::{Result, SyncsrvError};
use crate::insight::InsightCache;
use crate::links::LinkMonitor;
use crate::store::RecordStore;

pub struct AppState {
    pub config: Arc<SyncsrvConfig>,

    /// Versioned record collection
    pub records: Arc<RecordStore>,

    /// Node registry, replaced as a whole on status changes
    nodes: ArcSwap<NodeRegistry>,
    nodes_lock: Mutex<()>,

    pub catalog: Arc<RouteCatalog>,
    pub advisor: Arc<Advisor>,
    pub links: Arc<LinkMonitor>,
    pub insight: InsightCache,

    started_at: Instant,
}

impl AppState {
    pub fn new(
        config: SyncsrvConfig,
        registry: NodeRegistry,
        catalog: impl Into<Arc<RouteCatalog>>,
        advisor: Advisor,
        initial: RecordSet,
    ) -> Self {
        Self {
            config: Arc::new(config),
            records: Arc::new(RecordStore::new(initial)),
            nodes: ArcSwap::from_pointee(registry),
            nodes_lock: Mutex::new(()),
            catalog: catalog.into(),
            advisor: Arc::new(advisor),
            links: Arc::new(LinkMonitor::standard()),
            insight: InsightCache::new(),
            started_at: Instant::now(),
        }
    }

    pub fn nodes(&self) -> Arc<NodeRegistry> {
        self.nodes.load_full()
    }

    /// Flip a node between active and inactive and return its new entry
    pub fn toggle_node(&self, id: &str) -> Result<ServerNode> {
        let _guard = self.nodes_lock.lock();
        let current = self.nodes.load_full();
        let node = current
            .get(id)
            .ok_or_else(|| ModelError::NodeNotFound(id.to_string()))?;

        let status = node.status.toggled();
        let next = current.with_status(id, status)?;
        let updated = next
            .get(id)
            .cloned()
            .ok_or_else(|| SyncsrvError::Internal(format!("node {} vanished", id)))?;
        self.nodes.store(Arc::new(next));

        info!("Node {} is now {:?}", id, status);
        Ok(updated)
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use syncmon_model::NodeStatus;

    fn state() -> AppState {
        AppState::new(
            SyncsrvConfig::default(),
            NodeRegistry::standard(),
            RouteCatalog::standard(),
            Advisor::offline(),
            RecordSet::empty(),
        )
    }

    #[test]
    fn test_toggle_node_round_trip() {
        let state = state();
        let before = state.nodes().get("KS").unwrap().status;

        let node = state.toggle_node("KS").unwrap();
        assert_eq!(node.status, before.toggled());
        assert_eq!(state.nodes().get("KS").unwrap().status, before.toggled());

        state.toggle_node("KS").unwrap();
        assert_eq!(state.nodes().get("KS").unwrap().status, before);
    }

    #[test]
    fn test_toggle_unknown_node() {
        let state = state();
        let err = state.toggle_node("ZZ").unwrap_err();
        assert!(matches!(err, SyncsrvError::Model(_)));
        assert_eq!(state.nodes().active_count(), NodeRegistry::standard().active_count());
    }

    #[test]
    fn test_readers_keep_their_snapshot() {
        let state = state();
        let held = state.nodes();
        state.toggle_node("DM").unwrap();
        assert_eq!(held.get("DM").unwrap().status, NodeStatus::Active);
        assert_eq!(state.nodes().get("DM").unwrap().status, NodeStatus::Inactive);
    }
}
