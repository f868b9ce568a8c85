//! Record API Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::Utc;
use common::{AppError, SuccessResponse};

use crate::api::dto::{FilterQuery, ForceSyncResponse, RecordList};
use crate::app_state::AppState;

/// Filtered records in collection order (newest first)
///
/// @route GET /api/records
/// @input Query(FilterQuery) - category, rule
/// @output Json<SuccessResponse<RecordList>>
/// @status 400 - Unknown category or rule
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<SuccessResponse<RecordList>>, AppError> {
    let filter = query.to_filter()?;
    let snapshot = state.records.snapshot();
    let records = filter.apply(snapshot.records());

    Ok(Json(SuccessResponse::new(RecordList {
        version: snapshot.version(),
        total: records.len(),
        records,
    })))
}

/// Push a pending record to in-transit
///
/// Unknown ids and records that are not pending are reported in the outcome
/// and leave the collection untouched.
///
/// @route POST /api/records/{id}/force-sync
/// @input Path(id) - record id
/// @output Json<SuccessResponse<ForceSyncResponse>> - outcome: advanced | unchanged | not_found
/// @side-effects Publishes a new collection version when the record advanced
pub async fn force_sync_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse<ForceSyncResponse>>, AppError> {
    let (version, outcome) = state.records.force_sync(&id, Utc::now());

    Ok(Json(SuccessResponse::new(ForceSyncResponse {
        id,
        version,
        outcome,
    })))
}
