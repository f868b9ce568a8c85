//! Static advisory backend, used when no external service is configured

use async_trait::async_trait;

use super::{AdvisoryService, ConnectivityDiagnosis, HealthInsight, HealthSummary};
use crate::error::Result;
use crate::links::LinkSample;

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticAdvisory;

#[async_trait]
impl AdvisoryService for StaticAdvisory {
    fn name(&self) -> &str {
        "static"
    }

    async fn analyze_health(&self, _summary: &HealthSummary) -> Result<HealthInsight> {
        Ok(HealthInsight::fallback())
    }

    async fn diagnose_connectivity(&self, _links: &[LinkSample]) -> Result<ConnectivityDiagnosis> {
        Ok(ConnectivityDiagnosis::fallback())
    }
}
