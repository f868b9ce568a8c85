//! Health Check API Handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::State, response::Json};
use common::{AppError, ComponentHealth, HealthStatus, SuccessResponse};

use crate::app_state::AppState;
use crate::config::SERVICE_NAME;

/// Service health
///
/// Degraded when the collection is empty or the advisory backend last fell
/// back. Neither stops the dashboard from working.
///
/// @route GET /health
/// @output Json<SuccessResponse<HealthStatus>> - status, uptime, component checks
/// @side-effects None (read-only operation)
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<HealthStatus>>, AppError> {
    let snapshot = state.records.snapshot();
    let mut checks = HashMap::new();

    let records = if snapshot.is_empty() {
        ComponentHealth::degraded("no records")
    } else {
        ComponentHealth::healthy(format!(
            "{} records at version {}",
            snapshot.len(),
            snapshot.version()
        ))
    };
    checks.insert("records".to_string(), records);

    let advisory = match state.insight.get() {
        Some(cached) if cached.advice.fallback => ComponentHealth::degraded(format!(
            "{} backend failed, serving fallback",
            state.advisor.backend_name()
        )),
        _ => ComponentHealth::healthy(format!("{} backend", state.advisor.backend_name())),
    };
    checks.insert("advisory".to_string(), advisory);

    let registry = state.nodes();
    checks.insert(
        "nodes".to_string(),
        ComponentHealth::healthy(format!(
            "{}/{} active",
            registry.active_count(),
            registry.len()
        )),
    );

    let health = HealthStatus::from_checks(
        SERVICE_NAME,
        env!("CARGO_PKG_VERSION"),
        state.uptime_seconds(),
        checks,
    );
    Ok(Json(
        SuccessResponse::new(health)
            .with_metadata("version", snapshot.version().into())
            .with_metadata("record_count", snapshot.len().into()),
    ))
}
