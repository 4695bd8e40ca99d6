//! Error-path tests: wrong-broker redirects, unknown topics, malformed
//! requests, and coordination backend failures.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::setup::TestContext;
use serde_json::json;

#[tokio::test]
async fn produce_to_non_leader_returns_wrong_broker_redirect() {
    let ctx = TestContext::new("b1").await;
    ctx.create_topic("orders", 1).await;
    ctx.register_broker("b2", "127.0.0.1:7001").await;
    ctx.coordination
        .set_partition_leader("orders", 0, "b2")
        .await
        .unwrap();

    let server = TestServer::new(ctx.router.clone()).expect("failed to create test server");
    let response = server
        .post("/produce")
        .json(&json!({
            "producer_id": "p1",
            "messages": [{"key": "aw==", "value": "YQ==", "topic": "orders", "partition": 0, "timestamp": 0}],
        }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error_message"]
        .as_str()
        .unwrap()
        .contains("127.0.0.1:7001"));
}

#[tokio::test]
async fn consume_from_unknown_topic_is_a_domain_failure_not_http_error() {
    let ctx = TestContext::new("b1").await;
    let server = TestServer::new(ctx.router.clone()).expect("failed to create test server");

    let response = server
        .post("/consume")
        .json(&json!({
            "group_id": "g1",
            "topic": "missing",
            "partition": 0,
            "start_offset": 0,
            "max_messages": 10,
        }))
        .await;

    // Domain errors stay HTTP 200 with success=false (spec's RPC error
    // model), unlike malformed requests below.
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn malformed_produce_request_is_rejected_with_bad_request() {
    let ctx = TestContext::new("b1").await;
    let server = TestServer::new(ctx.router.clone()).expect("failed to create test server");

    let response = server
        .post("/produce")
        .json(&json!({ "producer_id": "", "messages": [] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn broker_address_lookup_for_unknown_broker_is_a_domain_failure() {
    let ctx = TestContext::new("b1").await;
    let server = TestServer::new(ctx.router.clone()).expect("failed to create test server");

    let response = server.get("/brokers/ghost").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn coordination_backend_failure_surfaces_as_domain_error() {
    let ctx = TestContext::new("b1").await;
    ctx.create_topic("orders", 1).await;
    ctx.set_coordination_failure(true);

    let server = TestServer::new(ctx.router.clone()).expect("failed to create test server");
    let response = server
        .post("/metadata")
        .json(&json!({ "topic": "orders" }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn shutdown_of_other_broker_redirects_to_its_address() {
    let ctx = TestContext::new("b1").await;
    ctx.register_broker("b2", "127.0.0.1:7001").await;

    let server = TestServer::new(ctx.router.clone()).expect("failed to create test server");
    let response = server
        .post("/admin/shutdown")
        .json(&json!({ "broker_id": "b2" }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["broker_address"], "127.0.0.1:7001");
}

#[tokio::test]
async fn draining_broker_rejects_produce_consume_and_commit() {
    let ctx = TestContext::new("b1").await;
    ctx.create_topic("orders", 1).await;
    ctx.state.begin_draining();

    let server = TestServer::new(ctx.router.clone()).expect("failed to create test server");

    let produce = server
        .post("/produce")
        .json(&json!({
            "producer_id": "p1",
            "messages": [{"key": "aw==", "value": "YQ==", "topic": "orders", "partition": 0, "timestamp": 0}],
        }))
        .await;
    produce.assert_status_ok();
    assert_eq!(produce.json::<serde_json::Value>()["success"], false);

    let consume = server
        .post("/consume")
        .json(&json!({
            "group_id": "g1",
            "topic": "orders",
            "partition": 0,
            "start_offset": 0,
            "max_messages": 10,
        }))
        .await;
    consume.assert_status_ok();
    assert_eq!(consume.json::<serde_json::Value>()["success"], false);

    let commit = server
        .post("/offsets/commit")
        .json(&json!({ "group_id": "g1", "topic": "orders", "partition": 0, "offset": 0 }))
        .await;
    commit.assert_status_ok();
    assert_eq!(commit.json::<serde_json::Value>()["success"], false);
}
