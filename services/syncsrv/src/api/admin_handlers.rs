//! Admin API handlers: runtime log level

use axum::response::Json;
use common::{AppError, SuccessResponse};

use crate::api::dto::{LogLevelRequest, LogLevelResponse};

/// Active log filter
///
/// @route GET /api/admin/log-level
/// @output Json<SuccessResponse<LogLevelResponse>> - "unknown" before logging is initialised
pub async fn get_log_level() -> Result<Json<SuccessResponse<LogLevelResponse>>, AppError> {
    Ok(Json(SuccessResponse::new(LogLevelResponse {
        level: common::logging::get_log_level(),
    })))
}

/// Replace the log filter
///
/// @route PUT /api/admin/log-level
/// @input Json(LogLevelRequest) - tracing directive, e.g. "debug" or "info,syncsrv=trace"
/// @output Json<SuccessResponse<LogLevelResponse>>
/// @status 400 - Unparseable directive, or logging started without reload support
pub async fn set_log_level(
    Json(request): Json<LogLevelRequest>,
) -> Result<Json<SuccessResponse<LogLevelResponse>>, AppError> {
    let level = request.level.trim();
    common::logging::set_log_level(level)
        .map_err(|e| AppError::invalid_param("level", e.to_string()))?;

    Ok(Json(SuccessResponse::new(LogLevelResponse {
        level: level.to_string(),
    })))
}
