//! End-to-end produce/consume/metadata flows over the broker's HTTP surface.

use axum_test::TestServer;
use integration_tests::fixtures::record;
use integration_tests::setup::TestContext;
use serde_json::json;

#[tokio::test]
async fn produce_then_consume_round_trips_over_http() {
    let ctx = TestContext::new("b1").await;
    ctx.create_topic("orders", 1).await;
    let server = TestServer::new(ctx.router.clone()).expect("failed to create test server");

    let produce = server
        .post("/produce")
        .json(&json!({
            "producer_id": "p1",
            "messages": [record("k1", "v1", "orders", 0)],
        }))
        .await;
    produce.assert_status_ok();
    let produce_body: serde_json::Value = produce.json();
    assert_eq!(produce_body["success"], true);

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
    let consume_body: serde_json::Value = consume.json();
    assert_eq!(consume_body["success"], true);
    assert_eq!(consume_body["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn metadata_reports_one_entry_per_partition() {
    let ctx = TestContext::new("b1").await;
    ctx.create_topic("clicks", 3).await;
    let server = TestServer::new(ctx.router.clone()).expect("failed to create test server");

    let response = server
        .post("/metadata")
        .json(&json!({ "topic": "clicks" }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["partitions"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn consuming_an_empty_partition_returns_no_messages() {
    let ctx = TestContext::new("b1").await;
    ctx.create_topic("orders", 1).await;
    let server = TestServer::new(ctx.router.clone()).expect("failed to create test server");

    let response = server
        .post("/consume")
        .json(&json!({
            "group_id": "g1",
            "topic": "orders",
            "partition": 0,
            "start_offset": 0,
            "max_messages": 10,
        }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body["messages"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn key_spread_lands_across_distinct_partitions() {
    let ctx = TestContext::new("b1").await;
    ctx.create_topic("events", 4).await;
    let server = TestServer::new(ctx.router.clone()).expect("failed to create test server");

    // Produce directly against every partition (the broker doesn't itself
    // hash keys, that's the Producer Batcher's job on the client side),
    // then verify each partition independently tracks its own offsets.
    for partition in 0..4 {
        let produce = server
            .post("/produce")
            .json(&json!({
                "producer_id": "p1",
                "messages": [record("k", "v", "events", partition)],
            }))
            .await;
        produce.assert_status_ok();
    }

    for partition in 0..4 {
        let response = server
            .post("/consume")
            .json(&json!({
                "group_id": "g1",
                "topic": "events",
                "partition": partition,
                "start_offset": 0,
                "max_messages": 10,
            }))
            .await;
        let body: serde_json::Value = response.json();
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }
}
