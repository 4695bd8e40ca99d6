//! Common test setup functions.

use std::sync::Arc;

use axum::Router;
use qbroker_broker::{router, BrokerConfig, BrokerState};
use qbroker_coordination::CoordinationClient;
use qbroker_core::TopicMetadata;

use crate::mocks::FlakyCoordination;

const DEFAULT_BROKER_ADDRESS: &str = "127.0.0.1:7000";

/// A single broker wired against an in-process coordination backend,
/// exposed as a router over `axum-test`. This exercises the exact same
/// handler/service code path production traffic hits.
pub struct TestContext {
    pub coordination: Arc<FlakyCoordination>,
    pub state: BrokerState,
    pub router: Router,
}

impl TestContext {
    /// Creates a context whose broker, `broker_id`, leads every partition
    /// of every topic registered through [`TestContext::create_topic`].
    pub async fn new(broker_id: &str) -> Self {
        let coordination = FlakyCoordination::new();
        coordination
            .register_broker(broker_id, DEFAULT_BROKER_ADDRESS, 60_000)
            .await
            .unwrap();

        let config = BrokerConfig {
            broker_id: broker_id.to_string(),
            ..Default::default()
        };
        let state = BrokerState::new(config, coordination.clone());
        let router = router(state.clone());

        Self {
            coordination,
            state,
            router,
        }
    }

    /// Registers `topic` with `partitions` partitions, with this context's
    /// broker as leader of every partition.
    pub async fn create_topic(&self, topic: &str, partitions: i32) {
        self.coordination
            .create_topic(TopicMetadata::new(topic, partitions))
            .await
            .unwrap();
        for partition in 0..partitions {
            self.coordination
                .set_partition_leader(topic, partition, self.state.broker_id())
                .await
                .unwrap();
        }
    }

    /// Registers a second broker at `address`, not leading anything, so
    /// tests can exercise wrong-broker redirects and multi-broker metadata.
    pub async fn register_broker(&self, broker_id: &str, address: &str) {
        self.coordination
            .register_broker(broker_id, address, 60_000)
            .await
            .unwrap();
    }

    pub fn set_coordination_failure(&self, should_fail: bool) {
        self.coordination.set_should_fail(should_fail);
    }
}
