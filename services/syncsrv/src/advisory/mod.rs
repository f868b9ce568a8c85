//! Advisory service capability
//!
//! The advisor is an injected [`AdvisoryService`]. [`Advisor`] wraps any
//! backend and substitutes the fixed fallback when the backend fails or
//! answers with something out of range, so callers always get a payload.

pub mod fallback;
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use syncmon_model::{NodeRegistry, Stage, SyncRecord};
use tracing::{debug, warn};

use crate::error::{Result, SyncsrvError};
use crate::links::LinkSample;

pub use fallback::StaticAdvisory;
pub use http::HttpAdvisory;

/// Counts the health analysis is based on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    pub total: usize,
    pub pending: usize,
    pub in_transit: usize,
    /// Node display names involved in replication
    pub nodes: Vec<String>,
}

impl HealthSummary {
    pub fn from_records(records: &[SyncRecord], registry: &NodeRegistry) -> Self {
        let count = |stage: Stage| records.iter().filter(|r| r.flag.stage == stage).count();
        Self {
            total: records.len(),
            pending: count(Stage::Pending),
            in_transit: count(Stage::InTransit),
            nodes: registry.iter().map(|n| n.name.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthInsight {
    pub summary: String,
    pub recommendation: String,
}

impl HealthInsight {
    pub fn fallback() -> Self {
        Self {
            summary: "Sync monitoring active. System processing heartbeat received.".to_string(),
            recommendation: "Review DB link buffer sizes if Port latency exceeds 250ms.".to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.summary.trim().is_empty() {
            return Err(SyncsrvError::advisory("empty health summary"));
        }
        if self.recommendation.trim().is_empty() {
            return Err(SyncsrvError::advisory("empty health recommendation"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(alias = "low", alias = "LOW")]
    Low,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "high", alias = "HIGH")]
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityDiagnosis {
    /// Connectivity confidence, 0..=100
    pub score: f64,
    #[serde(alias = "logEntry")]
    pub log_entry: String,
    #[serde(alias = "riskLevel")]
    pub risk_level: RiskLevel,
}

impl ConnectivityDiagnosis {
    pub fn fallback() -> Self {
        Self {
            score: 98.0,
            log_entry: "All database links (DS/TS/KS) reporting stable handshakes.".to_string(),
            risk_level: RiskLevel::Low,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.score) {
            return Err(SyncsrvError::advisory(format!(
                "connectivity score {} outside 0..=100",
                self.score
            )));
        }
        if self.log_entry.trim().is_empty() {
            return Err(SyncsrvError::advisory("empty connectivity log entry"));
        }
        Ok(())
    }
}

/// External analysis of replication health and link statistics
#[async_trait]
pub trait AdvisoryService: Send + Sync {
    /// Backend name for logs and health output
    fn name(&self) -> &str;

    async fn analyze_health(&self, summary: &HealthSummary) -> Result<HealthInsight>;

    async fn diagnose_connectivity(&self, links: &[LinkSample]) -> Result<ConnectivityDiagnosis>;
}

/// An advisory answer and whether it came from the fallback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice<T> {
    #[serde(flatten)]
    pub value: T,
    pub fallback: bool,
    pub generated_at: DateTime<Utc>,
}

impl<T> Advice<T> {
    fn new(value: T, fallback: bool) -> Self {
        Self {
            value,
            fallback,
            generated_at: Utc::now(),
        }
    }
}

/// Fallback-substituting wrapper around an advisory backend
pub struct Advisor {
    backend: Arc<dyn AdvisoryService>,
}

impl Advisor {
    pub fn new(backend: Arc<dyn AdvisoryService>) -> Self {
        Self { backend }
    }

    /// Advisor that always answers with the fallback
    pub fn offline() -> Self {
        Self::new(Arc::new(StaticAdvisory))
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub async fn analyze_health(&self, summary: &HealthSummary) -> Advice<HealthInsight> {
        let result = self
            .backend
            .analyze_health(summary)
            .await
            .and_then(|i| i.validate().map(|()| i));
        match result {
            Ok(insight) => {
                debug!("Health insight from {}", self.backend.name());
                Advice::new(insight, false)
            },
            Err(e) => {
                warn!(
                    "Health analysis via {} failed, using fallback: {}",
                    self.backend.name(),
                    e
                );
                Advice::new(HealthInsight::fallback(), true)
            },
        }
    }

    pub async fn diagnose_connectivity(
        &self,
        links: &[LinkSample],
    ) -> Advice<ConnectivityDiagnosis> {
        let result = self
            .backend
            .diagnose_connectivity(links)
            .await
            .and_then(|d| d.validate().map(|()| d));
        match result {
            Ok(diagnosis) => Advice::new(diagnosis, false),
            Err(e) => {
                warn!(
                    "Connectivity diagnosis via {} failed, using fallback: {}",
                    self.backend.name(),
                    e
                );
                Advice::new(ConnectivityDiagnosis::fallback(), true)
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::links::LinkMonitor;
    use chrono::TimeZone;
    use syncmon_model::{DataCategory, NodeId, SyncFlag, SyncRule};
    use tracing_test::traced_test;

    struct Broken;

    #[async_trait]
    impl AdvisoryService for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn analyze_health(&self, _summary: &HealthSummary) -> Result<HealthInsight> {
            Err(SyncsrvError::AdvisoryTimeout)
        }

        async fn diagnose_connectivity(&self, _links: &[LinkSample]) -> Result<ConnectivityDiagnosis> {
            Ok(ConnectivityDiagnosis {
                score: 140.0,
                log_entry: "overconfident".to_string(),
                risk_level: RiskLevel::Low,
            })
        }
    }

    #[test]
    fn test_health_summary_counts() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mk = |id: &str, flag| {
            SyncRecord::new(
                id,
                NodeId::new("DM"),
                NodeId::new("TS"),
                DataCategory::Master,
                SyncRule::AllData,
                flag,
                at,
            )
        };
        let records = vec![
            mk("1", SyncFlag::REGIONAL_PENDING),
            mk("2", SyncFlag::REGIONAL_IN_TRANSIT),
            mk("3", SyncFlag::REGIONAL_SUCCESS),
            mk("4", SyncFlag::REGIONAL_PENDING),
        ];
        let summary = HealthSummary::from_records(&records, &NodeRegistry::standard());
        assert_eq!(summary.total, 4);
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.in_transit, 1);
        assert_eq!(summary.nodes.len(), 4);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_failed_health_analysis_uses_fallback() {
        let advisor = Advisor::new(Arc::new(Broken));
        let summary = HealthSummary::from_records(&[], &NodeRegistry::standard());

        let advice = advisor.analyze_health(&summary).await;
        assert!(advice.fallback);
        assert_eq!(advice.value, HealthInsight::fallback());
        assert!(logs_contain("using fallback"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_out_of_range_score_uses_fallback() {
        let advisor = Advisor::new(Arc::new(Broken));
        let links = LinkMonitor::standard().samples();

        let advice = advisor.diagnose_connectivity(&links).await;
        assert!(advice.fallback);
        assert_eq!(advice.value.score, 98.0);
        assert_eq!(advice.value.risk_level, RiskLevel::Low);
        assert!(logs_contain("outside 0..=100"));
    }

    #[tokio::test]
    async fn test_offline_advisor_is_fallback_without_flag() {
        let advisor = Advisor::offline();
        let advice = advisor
            .analyze_health(&HealthSummary::from_records(&[], &NodeRegistry::standard()))
            .await;
        // the static backend succeeds, so this is not counted as a failure
        assert!(!advice.fallback);
        assert_eq!(advice.value, HealthInsight::fallback());
        assert_eq!(advisor.backend_name(), "static");
    }

    #[test]
    fn test_blank_insight_is_rejected() {
        let insight: HealthInsight =
            serde_json::from_str(r#"{"summary": "", "recommendation": " "}"#).unwrap();
        let err = insight.validate().unwrap_err();
        assert!(err.to_string().contains("empty health summary"));

        let insight = HealthInsight {
            summary: "2 pending".to_string(),
            recommendation: String::new(),
        };
        assert!(insight.validate().is_err());
        assert!(HealthInsight::fallback().validate().is_ok());
    }

    #[test]
    fn test_diagnosis_accepts_camel_case() {
        let json = r#"{"score": 72, "logEntry": "KS jitter rising", "riskLevel": "medium"}"#;
        let diagnosis: ConnectivityDiagnosis = serde_json::from_str(json).unwrap();
        assert_eq!(diagnosis.score, 72.0);
        assert_eq!(diagnosis.risk_level, RiskLevel::Medium);
        assert!(diagnosis.validate().is_ok());
    }
}
