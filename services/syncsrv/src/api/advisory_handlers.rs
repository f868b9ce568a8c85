//! Advisory and link API Handlers
//!
//! Advisory endpoints always answer 200; a failing backend shows up as
//! `"fallback": true` in the payload.

use std::sync::Arc;

use axum::{extract::State, response::Json};
use common::{AppError, SuccessResponse};

use crate::advisory::{Advice, ConnectivityDiagnosis};
use crate::app_state::AppState;
use crate::insight::{refresh_insight, CachedInsight};
use crate::links::LinkSample;

/// Current link heartbeat samples
///
/// @route GET /api/links
/// @output Json<SuccessResponse<Vec<LinkSample>>> - latency_ms 0 means the link is down
pub async fn get_links(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<Vec<LinkSample>>>, AppError> {
    Ok(Json(SuccessResponse::new(state.links.samples())))
}

/// Last cached health insight
///
/// @route GET /api/insight
/// @output Json<SuccessResponse<Option<CachedInsight>>> - null until the first refresh
pub async fn get_insight(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<Option<CachedInsight>>>, AppError> {
    let insight = state.insight.get().map(|cached| (*cached).clone());
    Ok(Json(SuccessResponse::new(insight)))
}

/// Ask the advisor now and replace the cached insight
///
/// @route POST /api/insight/refresh
/// @output Json<SuccessResponse<CachedInsight>>
/// @side-effects Calls the advisory backend
pub async fn refresh_insight_now(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<CachedInsight>>, AppError> {
    let cached = refresh_insight(&state).await;
    Ok(Json(SuccessResponse::new((*cached).clone())))
}

/// Connectivity diagnostic over the current link samples
///
/// @route POST /api/diagnostics/connectivity
/// @output Json<SuccessResponse<Advice<ConnectivityDiagnosis>>> - score, log_entry, risk_level
/// @side-effects Calls the advisory backend
pub async fn diagnose_connectivity(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<Advice<ConnectivityDiagnosis>>>, AppError> {
    let samples = state.links.samples();
    let advice = state.advisor.diagnose_connectivity(&samples).await;
    Ok(Json(
        SuccessResponse::new(advice).with_metadata("links", samples.len().into()),
    ))
}
