//! Dashboard API Handlers
//!
//! Every view is computed from a single snapshot of the collection, after
//! applying the category / rule filter from the query string.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::Utc;
use common::{AppError, SuccessResponse};
use serde::Serialize;
use syncmon_stats::{
    compute_kpis, exceptions, lanes, route_progress, DashboardContext, DashboardView,
    ExceptionEntry, GlobalKpis, LaneProgress, RouteProgress,
};

use crate::api::dto::{ExceptionsQuery, FilterQuery};
use crate::app_state::AppState;
use crate::insight::CachedInsight;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub view: DashboardView,
    /// Last cached health insight, if one has been computed yet
    pub insight: Option<CachedInsight>,
}

/// Full dashboard bundle
///
/// @route GET /api/dashboard
/// @input Query(FilterQuery) - category, rule
/// @output Json<SuccessResponse<DashboardResponse>> - KPIs, lanes, routes, nodes, exceptions, insight
/// @status 400 - Unknown category or rule
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<SuccessResponse<DashboardResponse>>, AppError> {
    let filter = query.to_filter()?;
    let snapshot = state.records.snapshot();
    let registry = state.nodes();
    let ctx = DashboardContext {
        registry: &registry,
        catalog: &state.catalog,
        attribution: state.config.exceptions.attribution,
        now: Utc::now(),
    };

    let view = DashboardView::compute(&snapshot, filter, &ctx);
    let insight = state.insight.get().map(|cached| (*cached).clone());

    Ok(Json(
        SuccessResponse::new(DashboardResponse { view, insight })
            .with_metadata("version", snapshot.version().into()),
    ))
}

/// Global KPIs
///
/// @route GET /api/kpis
/// @input Query(FilterQuery) - category, rule
/// @output Json<SuccessResponse<GlobalKpis>>
/// @status 400 - Unknown category or rule
pub async fn get_kpis(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<SuccessResponse<GlobalKpis>>, AppError> {
    let filter = query.to_filter()?;
    let snapshot = state.records.snapshot();
    let records = filter.apply(snapshot.records());

    Ok(Json(
        SuccessResponse::new(compute_kpis(&records, &state.nodes()))
            .with_metadata("version", snapshot.version().into()),
    ))
}

/// Progress of every catalog route
///
/// @route GET /api/routes
/// @input Query(FilterQuery) - category, rule
/// @output Json<SuccessResponse<Vec<RouteProgress>>> - catalog order
/// @status 400 - Unknown category or rule
pub async fn get_routes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<SuccessResponse<Vec<RouteProgress>>>, AppError> {
    let filter = query.to_filter()?;
    let snapshot = state.records.snapshot();
    let records = filter.apply(snapshot.records());

    Ok(Json(
        SuccessResponse::new(route_progress(&records, &state.catalog))
            .with_metadata("version", snapshot.version().into()),
    ))
}

/// Primary and regional lanes
///
/// @route GET /api/lanes
/// @input Query(FilterQuery) - category, rule
/// @output Json<SuccessResponse<Vec<LaneProgress>>>
/// @status 400 - Unknown category or rule
pub async fn get_lanes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<SuccessResponse<Vec<LaneProgress>>>, AppError> {
    let filter = query.to_filter()?;
    let snapshot = state.records.snapshot();
    let records = filter.apply(snapshot.records());

    Ok(Json(
        SuccessResponse::new(lanes(&records))
            .with_metadata("version", snapshot.version().into()),
    ))
}

/// Pending records with aging and region, newest first
///
/// @route GET /api/exceptions
/// @input Query(ExceptionsQuery) - category, rule, attribution (source_first | registry_order)
/// @output Json<SuccessResponse<Vec<ExceptionEntry>>>
/// @status 400 - Unknown category, rule or attribution policy
pub async fn get_exceptions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExceptionsQuery>,
) -> Result<Json<SuccessResponse<Vec<ExceptionEntry>>>, AppError> {
    let filter = query.to_filter()?;
    let policy = query.attribution_or(state.config.exceptions.attribution)?;
    let snapshot = state.records.snapshot();
    let records = filter.apply(snapshot.records());

    let entries = exceptions(&records, &state.nodes(), Utc::now(), policy);
    let critical = entries.iter().filter(|e| e.critical).count();

    Ok(Json(
        SuccessResponse::new(entries)
            .with_metadata("version", snapshot.version().into())
            .with_metadata("critical", critical.into()),
    ))
}
