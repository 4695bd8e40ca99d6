//! Tests for health check endpoints.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::setup::TestContext;

#[tokio::test]
async fn health_endpoint_structure() {
    let ctx = TestContext::new("b1").await;
    let server = TestServer::new(ctx.router.clone()).expect("failed to create test server");

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert!(body.get("status").is_some(), "response should have 'status'");
    assert!(
        body.get("coordination_connected").is_some(),
        "response should have 'coordination_connected'"
    );
    assert!(
        body.get("known_brokers").is_some(),
        "response should have 'known_brokers'"
    );
}

#[tokio::test]
async fn ready_endpoint_ok_when_coordination_is_healthy() {
    let ctx = TestContext::new("b1").await;
    let server = TestServer::new(ctx.router.clone()).expect("failed to create test server");

    let response = server.get("/health/ready").await;
    let status = response.status_code();
    assert!(
        status == StatusCode::OK || status == StatusCode::SERVICE_UNAVAILABLE,
        "ready endpoint should return 200 or 503, got {status}"
    );
}

#[tokio::test]
async fn live_endpoint_is_always_reachable() {
    let ctx = TestContext::new("b1").await;
    let server = TestServer::new(ctx.router.clone()).expect("failed to create test server");

    let response = server.get("/health/live").await;
    let status = response.status_code();
    assert!(
        status == StatusCode::OK || status == StatusCode::SERVICE_UNAVAILABLE,
        "live endpoint should return 200 or 503, got {status}"
    );
}

#[tokio::test]
async fn ready_reports_unavailable_while_draining() {
    let ctx = TestContext::new("b1").await;
    ctx.state.begin_draining();
    let server = TestServer::new(ctx.router.clone()).expect("failed to create test server");

    let response = server.get("/health/ready").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn health_endpoints_require_no_auth() {
    let ctx = TestContext::new("b1").await;
    let server = TestServer::new(ctx.router.clone()).expect("failed to create test server");

    for path in ["/health", "/health/ready", "/health/live"] {
        let response = server.get(path).await;
        assert_ne!(
            response.status_code(),
            StatusCode::UNAUTHORIZED,
            "{path} should not require auth"
        );
    }
}
