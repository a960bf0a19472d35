//! HTTP surface tests, driving the router directly without binding a port

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::fixtures::*;
use lifecycle::cloud::Credentials;
use lifecycle::config::Config;
use lifecycle::reconciler::DesiredState;
use lifecycle::web::{create_router, AppState};
use lifecycle::{AlertService, LifecycleService, OperationTracker, Trigger};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    cloud: MockCloudServer,
    tracker: Arc<OperationTracker>,
    router: Router,
}

async fn setup() -> TestApp {
    let cloud = MockCloudServer::start().await;
    let config = Arc::new(Config {
        cluster_id: TEST_CLUSTER_ID.to_string(),
        api_base_url: cloud.base_url.clone(),
        pause_schedule: String::new(),
        credentials: Credentials::new("pub-key", "priv-key"),
        ..Config::default()
    });

    let tracker = Arc::new(OperationTracker::new());
    let service = Arc::new(LifecycleService::new(
        config.clone(),
        cloud.client(),
        tracker.clone(),
        Arc::new(AlertService::new(String::new()).unwrap()),
    ));

    let router = create_router(AppState::new(config, service));
    TestApp {
        cloud,
        tracker,
        router,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn reconcile(desired: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/cluster/reconcile")
        .header("content-type", "application/json")
        .body(Body::from(format!(r#"{{"desired":"{}"}}"#, desired)))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = setup().await;

    let (status, body) = send(&app.router, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["cluster_id"], TEST_CLUSTER_ID);
    assert_eq!(body["data"]["schedule_disabled"], false);
}

#[tokio::test]
async fn test_cluster_state_reports_raw_state() {
    let app = setup().await;
    app.cloud.mock_state(TEST_CLUSTER_ID, "MODIFYING").await;

    let (status, body) = send(&app.router, get("/api/cluster")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "MODIFYING");
    assert_eq!(body["data"]["recognized"], false);
}

#[tokio::test]
async fn test_cluster_state_upstream_failure_is_bad_gateway() {
    let app = setup().await;
    app.cloud.mock_status_error(TEST_CLUSTER_ID, 500).await;

    let (status, body) = send(&app.router, get("/api/cluster")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_reconcile_rejects_unknown_desired_state() {
    let app = setup().await;

    let (status, body) = send(&app.router, reconcile("sleeping")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(app.cloud.requests().await.is_empty());
}

#[tokio::test]
async fn test_reconcile_noop_when_already_running() {
    let app = setup().await;
    app.cloud.mock_state(TEST_CLUSTER_ID, "ACTIVE").await;

    let (status, body) = send(&app.router, reconcile("running")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["action_taken"], false);
    assert_eq!(body["data"]["desired"], "RUNNING");
    assert_eq!(app.cloud.transition_calls().await, 0);
}

#[tokio::test]
async fn test_reconcile_failure_is_reported_in_body() {
    let app = setup().await;
    app.cloud.mock_state(TEST_CLUSTER_ID, "MAINTENANCE").await;

    let (status, body) = send(&app.router, reconcile("PAUSED")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["error"], "UNKNOWN_STATE");
}

#[tokio::test]
async fn test_reconcile_conflicts_with_active_run() {
    let app = setup().await;
    app.tracker
        .try_start(TEST_CLUSTER_ID, DesiredState::Paused, Trigger::Scheduled)
        .await
        .unwrap();

    let (status, _) = send(&app.router, reconcile("PAUSED")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app.router, get("/api/operations/active")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_active"], 1);
}

#[tokio::test]
async fn test_schedule_shows_disabled_direction() {
    let app = setup().await;

    let (status, body) = send(&app.router, get("/api/schedule")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["resume"], "0 0 7 * * *");
    assert!(body["data"]["pause"].is_null());
    assert_eq!(body["data"]["disabled"], false);
}
