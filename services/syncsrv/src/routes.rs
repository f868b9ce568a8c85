//! API Route Configuration

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::api::admin_handlers::{get_log_level, set_log_level};
use crate::api::advisory_handlers::{
    diagnose_connectivity, get_insight, get_links, refresh_insight_now,
};
use crate::api::dashboard_handlers::{
    get_dashboard, get_exceptions, get_kpis, get_lanes, get_routes,
};
use crate::api::health_handlers::health_check;
use crate::api::node_handlers::{list_nodes, toggle_node_status};
use crate::api::record_handlers::{force_sync_record, list_records};
use crate::app_state::AppState;

/// Create all API routes for the Sync Service
pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Dashboard views
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/kpis", get(get_kpis))
        .route("/api/routes", get(get_routes))
        .route("/api/lanes", get(get_lanes))
        .route("/api/exceptions", get(get_exceptions))
        // Nodes and records
        .route("/api/nodes", get(list_nodes))
        .route("/api/nodes/{id}/status", put(toggle_node_status))
        .route("/api/records", get(list_records))
        .route("/api/records/{id}/force-sync", post(force_sync_record))
        // Links and advisory
        .route("/api/links", get(get_links))
        .route("/api/insight", get(get_insight))
        .route("/api/insight/refresh", post(refresh_insight_now))
        .route("/api/diagnostics/connectivity", post(diagnose_connectivity))
        // Admin
        .route("/api/admin/log-level", get(get_log_level).put(set_log_level))
        // Apply HTTP request logging middleware
        .layer(axum::middleware::from_fn(common::logging::http_request_logger))
        .with_state(state)
}
