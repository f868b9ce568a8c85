//! Node API Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use common::{AppError, SuccessResponse};
use syncmon_model::ServerNode;
use syncmon_stats::{node_summaries, NodeSummary};

use crate::api::dto::FilterQuery;
use crate::app_state::AppState;

/// Registry entries with outbound / inbound counts
///
/// @route GET /api/nodes
/// @input Query(FilterQuery) - category, rule
/// @output Json<SuccessResponse<Vec<NodeSummary>>> - registry order
/// @status 400 - Unknown category or rule
pub async fn list_nodes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<SuccessResponse<Vec<NodeSummary>>>, AppError> {
    let filter = query.to_filter()?;
    let snapshot = state.records.snapshot();
    let records = filter.apply(snapshot.records());
    let registry = state.nodes();

    Ok(Json(
        SuccessResponse::new(node_summaries(&records, &registry))
            .with_metadata("active", registry.active_count().into()),
    ))
}

/// Toggle a node's simulated status
///
/// @route PUT /api/nodes/{id}/status
/// @input Path(id) - node id, e.g. KS
/// @output Json<SuccessResponse<ServerNode>> - the node after the change
/// @status 404 - Unknown node
/// @side-effects Replaces the registry; records are not touched
pub async fn toggle_node_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse<ServerNode>>, AppError> {
    let node = state.toggle_node(&id)?;
    Ok(Json(SuccessResponse::new(node)))
}
