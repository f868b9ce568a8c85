//! Common test utilities and helpers

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use syncmon_model::{DataCategory, NodeId, NodeRegistry, RecordSet, SyncFlag, SyncRecord, SyncRule};
use syncmon_routing::RouteCatalog;
use syncsrv::{
    create_routes, AdvisoryService, Advisor, AppState, ConnectivityDiagnosis, HealthInsight,
    HealthSummary, LinkSample, RiskLevel, SyncsrvConfig, SyncsrvError,
};
use tower::util::ServiceExt;

/// Deterministic advisory backend that counts calls and can be told to fail
#[derive(Default)]
pub struct MockAdvisory {
    pub fail: bool,
    /// Answer health requests with a well-formed but empty reply
    pub blank: bool,
    pub calls: AtomicU32,
}

impl MockAdvisory {
    pub fn working() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn blank() -> Arc<Self> {
        Arc::new(Self {
            blank: true,
            ..Self::default()
        })
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdvisoryService for MockAdvisory {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze_health(&self, summary: &HealthSummary) -> syncsrv::Result<HealthInsight> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SyncsrvError::advisory("mock backend unavailable"));
        }
        if self.blank {
            let insight = serde_json::from_value(json!({ "summary": "", "recommendation": "" }))
                .map_err(|e| SyncsrvError::advisory(e.to_string()))?;
            return Ok(insight);
        }
        Ok(HealthInsight {
            summary: format!("{} pending of {}", summary.pending, summary.total),
            recommendation: "Force sync the oldest pending record.".to_string(),
        })
    }

    async fn diagnose_connectivity(
        &self,
        links: &[LinkSample],
    ) -> syncsrv::Result<ConnectivityDiagnosis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SyncsrvError::AdvisoryTimeout);
        }
        Ok(ConnectivityDiagnosis {
            score: 71.0,
            log_entry: format!("{} links sampled", links.len()),
            risk_level: RiskLevel::Medium,
        })
    }
}

fn record(
    id: &str,
    route: (&str, &str),
    category: DataCategory,
    rule: SyncRule,
    flag: SyncFlag,
    hours_ago: i64,
) -> SyncRecord {
    SyncRecord::new(
        id,
        NodeId::new(route.0),
        NodeId::new(route.1),
        category,
        rule,
        flag,
        Utc::now() - Duration::hours(hours_ago),
    )
}

/// Four records, newest first:
/// - 20001 KS→TS transaction, regional pending, 1 h
/// - 20002 DM→TS master, regional success, 1 h
/// - 20003 TS→DM transaction sales/return, regional pending, 2 h
/// - 20004 DM→DS master, primary pending, 5 h (critical)
pub fn fixture_records() -> RecordSet {
    RecordSet::new(vec![
        record(
            "20001",
            ("KS", "TS"),
            DataCategory::Transaction,
            SyncRule::AllData,
            SyncFlag::REGIONAL_PENDING,
            1,
        ),
        record(
            "20002",
            ("DM", "TS"),
            DataCategory::Master,
            SyncRule::AllData,
            SyncFlag::REGIONAL_SUCCESS,
            1,
        ),
        record(
            "20003",
            ("TS", "DM"),
            DataCategory::Transaction,
            SyncRule::SalesReturn,
            SyncFlag::REGIONAL_PENDING,
            2,
        ),
        record(
            "20004",
            ("DM", "DS"),
            DataCategory::Master,
            SyncRule::AllData,
            SyncFlag::PRIMARY_PENDING,
            5,
        ),
    ])
}

pub fn create_test_state(backend: Arc<dyn AdvisoryService>) -> Arc<AppState> {
    Arc::new(AppState::new(
        SyncsrvConfig::default(),
        NodeRegistry::standard(),
        RouteCatalog::standard(),
        Advisor::new(backend),
        fixture_records(),
    ))
}

/// Router over fixture records with the offline advisor
pub fn create_test_router() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        SyncsrvConfig::default(),
        NodeRegistry::standard(),
        RouteCatalog::standard(),
        Advisor::offline(),
        fixture_records(),
    ));
    (create_routes(Arc::clone(&state)), state)
}

pub fn router_for(state: &Arc<AppState>) -> axum::Router {
    create_routes(Arc::clone(state))
}

/// Helper to make JSON requests
pub async fn json_request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(json) => request
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let body: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, body)
}
