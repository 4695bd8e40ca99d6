//! Mock implementations for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use qbroker_core::{Error, Result, TopicMetadata};
use qbroker_coordination::{CoordinationClient, InMemoryCoordination};
use std::sync::Arc;

/// Wraps a real `InMemoryCoordination` and can be switched to fail every
/// call on demand, so tests can exercise the broker's error paths (wrong
/// broker, backend failure) without a real coordination backend.
pub struct FlakyCoordination {
    inner: InMemoryCoordination,
    should_fail: Mutex<bool>,
}

impl FlakyCoordination {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryCoordination::new(),
            should_fail: Mutex::new(false),
        })
    }

    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }

    fn check(&self) -> Result<()> {
        if *self.should_fail.lock() {
            Err(Error::backend("induced coordination failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CoordinationClient for FlakyCoordination {
    async fn ensure_path(&self, path: &str) -> Result<()> {
        self.check()?;
        self.inner.ensure_path(path).await
    }

    async fn create_topic(&self, metadata: TopicMetadata) -> Result<()> {
        self.check()?;
        self.inner.create_topic(metadata).await
    }

    async fn list_partitions(&self, topic: &str) -> Result<Vec<i32>> {
        self.check()?;
        self.inner.list_partitions(topic).await
    }

    async fn get_topic(&self, topic: &str) -> Result<TopicMetadata> {
        self.check()?;
        self.inner.get_topic(topic).await
    }

    async fn register_broker(&self, broker_id: &str, address: &str, ttl_ms: i64) -> Result<()> {
        self.check()?;
        self.inner.register_broker(broker_id, address, ttl_ms).await
    }

    async fn renew_broker(&self, broker_id: &str, ttl_ms: i64) -> Result<()> {
        self.check()?;
        self.inner.renew_broker(broker_id, ttl_ms).await
    }

    async fn resolve_broker(&self, broker_id: &str) -> Result<String> {
        self.check()?;
        self.inner.resolve_broker(broker_id).await
    }

    async fn set_partition_leader(
        &self,
        topic: &str,
        partition: i32,
        broker_id: &str,
    ) -> Result<()> {
        self.check()?;
        self.inner.set_partition_leader(topic, partition, broker_id).await
    }

    async fn get_partition_leader(&self, topic: &str, partition: i32) -> Result<String> {
        self.check()?;
        self.inner.get_partition_leader(topic, partition).await
    }

    async fn set_consumer_offset(
        &self,
        group_id: &str,
        topic: &str,
        partition: i32,
        offset: i64,
    ) -> Result<()> {
        self.check()?;
        self.inner
            .set_consumer_offset(group_id, topic, partition, offset)
            .await
    }

    async fn get_consumer_offset(
        &self,
        group_id: &str,
        topic: &str,
        partition: i32,
    ) -> Result<i64> {
        self.check()?;
        self.inner.get_consumer_offset(group_id, topic, partition).await
    }

    async fn assign_partition(
        &self,
        group_id: &str,
        topic: &str,
        partition: i32,
        consumer_id: &str,
    ) -> Result<()> {
        self.check()?;
        self.inner
            .assign_partition(group_id, topic, partition, consumer_id)
            .await
    }

    async fn get_owner(&self, group_id: &str, topic: &str, partition: i32) -> Result<String> {
        self.check()?;
        self.inner.get_owner(group_id, topic, partition).await
    }

    async fn sweep_expired_brokers(&self) -> Vec<String> {
        if *self.should_fail.lock() {
            return Vec::new();
        }
        self.inner.sweep_expired_brokers().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn flaky_coordination_delegates_when_healthy() {
        let coordination = FlakyCoordination::new();
        coordination
            .create_topic(TopicMetadata::new("t", 1))
            .await
            .unwrap();
        assert_eq!(coordination.list_partitions("t").await.unwrap(), vec![0]);
    }

    #[tokio::test]
    async fn flaky_coordination_fails_every_call_when_flipped() {
        let coordination = FlakyCoordination::new();
        coordination.set_should_fail(true);
        let err = coordination
            .create_topic(TopicMetadata::new("t", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
    }
}
