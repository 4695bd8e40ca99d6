//! Broker Service core logic (spec §4.B), independent of the HTTP transport.

use std::collections::HashMap;

use qbroker_core::{Error, Record, Result};
use qbroker_log::AppendLog;
use tracing::{info, warn};

use crate::state::BrokerState;

/// Groups records by declared `(topic, partition)` and appends each group to
/// its Partition Log, rejecting the whole batch if any addressed partition
/// is not led by this broker. Returns an aggregate success only if every
/// group's `append_batch` succeeds (spec §4.B "Produce path").
pub async fn produce(state: &BrokerState, producer_id: &str, messages: Vec<Record>) -> Result<()> {
    if messages.is_empty() {
        return Ok(());
    }

    let mut groups: HashMap<(String, i32), Vec<Record>> = HashMap::new();
    for record in messages {
        groups
            .entry((record.topic.clone(), record.partition))
            .or_default()
            .push(record);
    }

    for ((topic, partition), records) in groups {
        let leader = state
            .coordination
            .get_partition_leader(&topic, partition)
            .await?;
        if leader != state.broker_id() {
            let redirect = state.coordination.resolve_broker(&leader).await.ok();
            warn!(
                producer_id,
                topic = %topic,
                partition,
                leader = %leader,
                "produce addressed to non-leader broker"
            );
            return Err(Error::wrong_broker(redirect));
        }

        let log = state.log_for(&topic, partition);
        let count = records.len();
        log.append_batch(records).await?;
        info!(producer_id, topic = %topic, partition, count, "appended batch");
    }

    Ok(())
}

/// Reads `[start_offset, start_offset + max_messages)` intersected with the
/// log. `group_id` is recorded for observability only and does not gate the
/// read (spec §4.B "Consume path" is stateless with respect to the caller).
pub async fn consume(
    state: &BrokerState,
    group_id: &str,
    topic: &str,
    partition: i32,
    start_offset: i64,
    max_messages: i32,
) -> Result<Vec<Record>> {
    let log = state
        .existing_log(topic, partition)
        .ok_or_else(|| Error::not_found(format!("unknown partition: {topic}/{partition}")))?;

    let records = log.read(start_offset, max_messages as i64).await?;
    info!(
        group_id,
        topic,
        partition,
        start_offset,
        returned = records.len(),
        "served consume"
    );
    Ok(records)
}

/// Partition count and per-partition broker addresses for `topic`.
pub async fn get_metadata(
    state: &BrokerState,
    topic: &str,
) -> Result<(i32, Vec<(i32, String)>)> {
    let meta = state.coordination.get_topic(topic).await?;
    let mut partitions = Vec::with_capacity(meta.partitions as usize);
    for partition in 0..meta.partitions {
        let leader = state
            .coordination
            .get_partition_leader(topic, partition)
            .await?;
        let address = state.coordination.resolve_broker(&leader).await?;
        partitions.push((partition, address));
    }
    Ok((meta.partitions, partitions))
}

pub async fn get_broker_address(state: &BrokerState, broker_id: &str) -> Result<String> {
    state.coordination.resolve_broker(broker_id).await
}

/// Persists a consumer group's committed offset through the Coordination
/// Client. Optional per spec §6; wired here since the client ships the
/// equivalent call.
pub async fn commit_offset(
    state: &BrokerState,
    group_id: &str,
    topic: &str,
    partition: i32,
    offset: i64,
) -> Result<()> {
    state
        .coordination
        .set_consumer_offset(group_id, topic, partition, offset)
        .await
}

/// Outcome of a `Shutdown` RPC (spec §4.B).
pub enum ShutdownOutcome {
    /// This broker matched `broker_id`; draining has begun.
    Accepted,
    /// `broker_id` names a different broker; callers should retry directly
    /// against this address instead of re-hopping through bootstrap.
    Redirect(String),
}

/// If `broker_id` names this broker: stop accepting new RPCs and let the
/// coordinator lease lapse instead of renewing it, so the registration is
/// reaped on the next sweep, the ephemeral-node model this broker's
/// registration already follows (spec §4.C: "ephemeral binding that expires
/// on broker death"). Otherwise looks up and returns the real owner's
/// address as a one-hop redirect.
pub async fn shutdown(state: &BrokerState, broker_id: &str) -> Result<ShutdownOutcome> {
    if broker_id == state.broker_id() {
        state.begin_draining();
        state
            .coordination
            .register_broker(broker_id, &state.config.advertised_address(), 0)
            .await?;
        info!(broker_id, "shutdown accepted, draining");
        Ok(ShutdownOutcome::Accepted)
    } else {
        let address = state.coordination.resolve_broker(broker_id).await?;
        Ok(ShutdownOutcome::Redirect(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbroker_coordination::InMemoryCoordination;
    use qbroker_core::TopicMetadata;
    use std::sync::Arc;

    async fn test_state(broker_id: &str) -> BrokerState {
        let coordination = Arc::new(InMemoryCoordination::new());
        coordination
            .register_broker(broker_id, "127.0.0.1:7000", 60_000)
            .await
            .unwrap();
        coordination
            .create_topic(TopicMetadata::new("orders", 2))
            .await
            .unwrap();
        coordination
            .set_partition_leader("orders", 0, broker_id)
            .await
            .unwrap();
        coordination
            .set_partition_leader("orders", 1, broker_id)
            .await
            .unwrap();

        let config = crate::config::BrokerConfig {
            broker_id: broker_id.to_string(),
            ..Default::default()
        };
        BrokerState::new(config, coordination)
    }

    #[tokio::test]
    async fn produce_then_consume_round_trips() {
        let state = test_state("b1").await;
        let record = Record::new(b"k".to_vec(), b"v".to_vec(), "orders", 0);
        produce(&state, "p1", vec![record]).await.unwrap();

        let out = consume(&state, "g1", "orders", 0, 0, 10).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, b"v".to_vec());
        assert_eq!(out[0].offset, Some(0));
    }

    #[tokio::test]
    async fn produce_to_non_leader_is_rejected() {
        let state = test_state("b1").await;
        state
            .coordination
            .register_broker("b2", "127.0.0.1:7001", 60_000)
            .await
            .unwrap();
        state
            .coordination
            .set_partition_leader("orders", 0, "b2")
            .await
            .unwrap();

        let record = Record::new(b"k".to_vec(), b"v".to_vec(), "orders", 0);
        let err = produce(&state, "p1", vec![record]).await.unwrap_err();
        match err {
            Error::WrongBroker { broker_address } => {
                assert_eq!(broker_address, Some("127.0.0.1:7001".to_string()))
            }
            other => panic!("expected WrongBroker, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn consume_unknown_partition_is_not_found() {
        let state = test_state("b1").await;
        let err = consume(&state, "g1", "orders", 1, 0, 10).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn consume_at_or_past_tail_is_empty() {
        let state = test_state("b1").await;
        let record = Record::new(b"k".to_vec(), b"v".to_vec(), "orders", 0);
        produce(&state, "p1", vec![record]).await.unwrap();

        let out = consume(&state, "g1", "orders", 0, 1, 10).await.unwrap();
        assert!(out.is_empty());

        let out = consume(&state, "g1", "orders", 0, 0, 0).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn metadata_reports_every_partition() {
        let state = test_state("b1").await;
        let (count, partitions) = get_metadata(&state, "orders").await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(partitions.len(), 2);
        assert!(partitions.iter().all(|(_, addr)| addr == "127.0.0.1:7000"));
    }

    #[tokio::test]
    async fn shutdown_of_self_begins_draining() {
        let state = test_state("b1").await;
        let outcome = shutdown(&state, "b1").await.unwrap();
        assert!(matches!(outcome, ShutdownOutcome::Accepted));
        assert!(state.is_draining());
    }

    #[tokio::test]
    async fn shutdown_of_other_broker_redirects() {
        let state = test_state("b1").await;
        state
            .coordination
            .register_broker("b2", "127.0.0.1:7001", 60_000)
            .await
            .unwrap();
        let outcome = shutdown(&state, "b2").await.unwrap();
        match outcome {
            ShutdownOutcome::Redirect(addr) => assert_eq!(addr, "127.0.0.1:7001"),
            ShutdownOutcome::Accepted => panic!("expected redirect"),
        }
        assert!(!state.is_draining());
    }
}
