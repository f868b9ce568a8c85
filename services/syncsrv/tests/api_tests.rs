//! API integration tests

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use axum::http::StatusCode;
use serde_json::json;

mod helpers;
use helpers::{create_test_router, create_test_state, json_request, router_for, MockAdvisory};

#[tokio::test]
async fn test_health_check() {
    let (app, _) = create_test_router();

    let (status, body) = json_request(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["service"], "syncsrv");
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["metadata"]["record_count"], 4);
}

#[tokio::test]
async fn test_dashboard_bundle() {
    let (app, _) = create_test_router();

    let (status, body) = json_request(&app, "GET", "/api/dashboard", None).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["kpis"]["total"], 4);
    assert_eq!(data["kpis"]["pending_primary"], 1);
    assert_eq!(data["kpis"]["pending_regional"], 2);
    assert_eq!(data["kpis"]["success"], 1);
    assert_eq!(data["lanes"].as_array().unwrap().len(), 2);
    assert_eq!(data["nodes"].as_array().unwrap().len(), 4);
    assert_eq!(data["exceptions"].as_array().unwrap().len(), 3);
    assert_eq!(data["critical_exceptions"], 1);
    assert!(data["insight"].is_null());
}

#[tokio::test]
async fn test_filters_narrow_every_view() {
    let (app, _) = create_test_router();

    let (_, body) = json_request(&app, "GET", "/api/kpis?category=master", None).await;
    assert_eq!(body["data"]["total"], 2);

    let (_, body) = json_request(&app, "GET", "/api/records?rule=sales_return", None).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["records"][0]["id"], "20003");

    let (_, body) = json_request(
        &app,
        "GET",
        "/api/exceptions?category=transaction&rule=all",
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_selector_is_bad_request() {
    let (app, _) = create_test_router();

    let (status, body) = json_request(&app, "GET", "/api/dashboard?category=bulk", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["error_code"], "INVALID_PARAMETER");
    assert!(body["error"]["field_errors"]["category"].is_array());

    let (status, _) = json_request(&app, "GET", "/api/lanes?rule=everything", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_routes_follow_catalog() {
    let (app, state) = create_test_router();

    let (status, body) = json_request(&app, "GET", "/api/routes", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), state.catalog.len());
}

#[tokio::test]
async fn test_force_sync_publishes_new_version() {
    let (app, state) = create_test_router();
    let before = state.records.version();

    let (status, body) =
        json_request(&app, "POST", "/api/records/20004/force-sync", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "advanced");
    assert_eq!(body["data"]["from"], "TN");
    assert_eq!(body["data"]["to"], "TS");
    let after = body["data"]["version"].as_u64().unwrap();
    assert!(after > before);
    assert_eq!(state.records.version(), after);

    // no longer pending, so no longer an exception
    let (_, body) = json_request(&app, "GET", "/api/dashboard", None).await;
    assert_eq!(body["data"]["exceptions"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["critical_exceptions"], 0);

    // a second push is a no-op
    let (status, body) =
        json_request(&app, "POST", "/api/records/20004/force-sync", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "unchanged");
    assert_eq!(body["data"]["version"].as_u64().unwrap(), after);
}

#[tokio::test]
async fn test_force_sync_unknown_record_keeps_version() {
    let (app, state) = create_test_router();
    let before = state.records.version();

    let (status, body) =
        json_request(&app, "POST", "/api/records/99999/force-sync", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "not_found");
    assert_eq!(body["data"]["version"].as_u64().unwrap(), before);
    assert_eq!(state.records.version(), before);
}

#[tokio::test]
async fn test_node_status_toggle() {
    let (app, _) = create_test_router();

    let (status, body) = json_request(&app, "PUT", "/api/nodes/KS/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], "KS");
    assert_eq!(body["data"]["status"], "active");

    let (_, body) = json_request(&app, "GET", "/api/nodes", None).await;
    assert_eq!(body["metadata"]["active"], 4);

    let (status, body) = json_request(&app, "PUT", "/api/nodes/ZZ/status", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_exception_attribution_policies() {
    let (app, _) = create_test_router();
    let region_of = |body: &serde_json::Value, id: &str| {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["record"]["id"] == id)
            .map(|e| e["region"].as_str().unwrap().to_string())
            .unwrap()
    };

    let (_, body) = json_request(&app, "GET", "/api/exceptions", None).await;
    assert_eq!(region_of(&body, "20001"), "Kenya");
    assert_eq!(region_of(&body, "20004"), "Dubai");
    assert_eq!(body["metadata"]["critical"], 1);

    let (_, body) = json_request(
        &app,
        "GET",
        "/api/exceptions?attribution=registry_order",
        None,
    )
    .await;
    assert_eq!(region_of(&body, "20001"), "Tanzania");

    let (status, _) =
        json_request(&app, "GET", "/api/exceptions?attribution=nearest", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failing_advisor_serves_fallback() {
    let backend = MockAdvisory::failing();
    let state = create_test_state(backend.clone());
    let app = router_for(&state);

    let (status, body) = json_request(&app, "POST", "/api/insight/refresh", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fallback"], true);
    assert_eq!(
        body["data"]["summary"],
        "Sync monitoring active. System processing heartbeat received."
    );

    let (status, body) =
        json_request(&app, "POST", "/api/diagnostics/connectivity", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fallback"], true);
    assert_eq!(body["data"]["score"], 98.0);
    assert_eq!(body["data"]["risk_level"], "Low");
    assert_eq!(backend.call_count(), 2);

    let (_, body) = json_request(&app, "GET", "/health", None).await;
    assert_eq!(body["data"]["status"], "degraded");
}

#[tokio::test]
async fn test_blank_insight_serves_fallback() {
    let backend = MockAdvisory::blank();
    let state = create_test_state(backend.clone());
    let app = router_for(&state);

    let (status, body) = json_request(&app, "POST", "/api/insight/refresh", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fallback"], true);
    assert_eq!(
        body["data"]["summary"],
        "Sync monitoring active. System processing heartbeat received."
    );
    assert_eq!(
        body["data"]["recommendation"],
        "Review DB link buffer sizes if Port latency exceeds 250ms."
    );
    assert_eq!(backend.call_count(), 1);

    let (_, body) = json_request(&app, "GET", "/health", None).await;
    assert_eq!(body["data"]["status"], "degraded");
}

#[tokio::test]
async fn test_working_advisor_is_cached() {
    let backend = MockAdvisory::working();
    let state = create_test_state(backend.clone());
    let app = router_for(&state);

    let (_, body) = json_request(&app, "GET", "/api/insight", None).await;
    assert!(body["data"].is_null());

    let (status, body) = json_request(&app, "POST", "/api/insight/refresh", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fallback"], false);
    assert_eq!(body["data"]["summary"], "3 pending of 4");
    assert_eq!(body["data"]["record_count"], 4);

    let (_, body) = json_request(&app, "GET", "/api/insight", None).await;
    assert_eq!(body["data"]["summary"], "3 pending of 4");
    let (_, body) = json_request(&app, "GET", "/api/dashboard", None).await;
    assert_eq!(body["data"]["insight"]["summary"], "3 pending of 4");
    assert_eq!(backend.call_count(), 1);

    let (_, body) = json_request(&app, "POST", "/api/diagnostics/connectivity", None).await;
    assert_eq!(body["data"]["risk_level"], "Medium");
    assert_eq!(body["data"]["log_entry"], "4 links sampled");
}

#[tokio::test]
async fn test_links_listing() {
    let (app, _) = create_test_router();

    let (status, body) = json_request(&app, "GET", "/api/links", None).await;

    assert_eq!(status, StatusCode::OK);
    let links = body["data"].as_array().unwrap();
    assert_eq!(links.len(), 4);
    assert_eq!(links[3]["link_name"], "DL_KENYA_PORT");
}

#[tokio::test]
async fn test_log_level_endpoints() {
    let (app, _) = create_test_router();

    let (status, body) = json_request(&app, "GET", "/api/admin/log-level", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["level"].is_string());

    let (status, body) = json_request(
        &app,
        "PUT",
        "/api/admin/log-level",
        Some(json!({ "level": "syncsrv=loud" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["field_errors"]["level"].is_array());
}
