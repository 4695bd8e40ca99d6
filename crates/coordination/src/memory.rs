//! In-process namespace backend for [`crate::CoordinationClient`].

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use qbroker_core::{Error, Result, TopicMetadata};
use tracing::info;

struct BrokerEntry {
    address: String,
    expires_at: Instant,
}

#[derive(Default)]
struct Namespace {
    paths: HashSet<String>,
    topics: HashMap<String, TopicMetadata>,
    brokers: HashMap<String, BrokerEntry>,
    leaders: HashMap<(String, i32), String>,
    offsets: HashMap<(String, String, i32), i64>,
    owners: HashMap<(String, String, i32), String>,
}

/// In-process stand-in for a ZooKeeper/etcd-style namespace. A single mutex
/// guards the whole tree; this crate is a client facade, not a performance
/// boundary, so there is no benefit to finer-grained locking here.
pub struct InMemoryCoordination {
    state: Mutex<Namespace>,
}

impl Default for InMemoryCoordination {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCoordination {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Namespace::default()),
        }
    }
}

#[async_trait]
impl crate::CoordinationClient for InMemoryCoordination {
    async fn ensure_path(&self, path: &str) -> Result<()> {
        self.state.lock().paths.insert(path.to_string());
        Ok(())
    }

    async fn create_topic(&self, metadata: TopicMetadata) -> Result<()> {
        let mut state = self.state.lock();
        if state.topics.contains_key(&metadata.name) {
            return Err(Error::conflict(format!("topic already exists: {}", metadata.name)));
        }
        state.paths.insert(format!("/topics/{}", metadata.name));
        for i in 0..metadata.partitions {
            state
                .paths
                .insert(format!("/topics/{}/{}", metadata.name, i));
        }
        state.topics.insert(metadata.name.clone(), metadata);
        Ok(())
    }

    async fn list_partitions(&self, topic: &str) -> Result<Vec<i32>> {
        let state = self.state.lock();
        let meta = state
            .topics
            .get(topic)
            .ok_or_else(|| Error::not_found(format!("unknown topic: {topic}")))?;
        Ok((0..meta.partitions).collect())
    }

    async fn get_topic(&self, topic: &str) -> Result<TopicMetadata> {
        self.state
            .lock()
            .topics
            .get(topic)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("unknown topic: {topic}")))
    }

    async fn register_broker(&self, broker_id: &str, address: &str, ttl_ms: i64) -> Result<()> {
        let mut state = self.state.lock();
        state.brokers.insert(
            broker_id.to_string(),
            BrokerEntry {
                address: address.to_string(),
                expires_at: Instant::now() + Duration::from_millis(ttl_ms.max(0) as u64),
            },
        );
        Ok(())
    }

    async fn renew_broker(&self, broker_id: &str, ttl_ms: i64) -> Result<()> {
        let mut state = self.state.lock();
        let entry = state
            .brokers
            .get_mut(broker_id)
            .ok_or_else(|| Error::not_found(format!("unknown broker_id: {broker_id}")))?;
        entry.expires_at = Instant::now() + Duration::from_millis(ttl_ms.max(0) as u64);
        Ok(())
    }

    async fn resolve_broker(&self, broker_id: &str) -> Result<String> {
        self.state
            .lock()
            .brokers
            .get(broker_id)
            .map(|e| e.address.clone())
            .ok_or_else(|| Error::not_found(format!("unknown broker_id: {broker_id}")))
    }

    async fn set_partition_leader(
        &self,
        topic: &str,
        partition: i32,
        broker_id: &str,
    ) -> Result<()> {
        self.state
            .lock()
            .leaders
            .insert((topic.to_string(), partition), broker_id.to_string());
        Ok(())
    }

    async fn get_partition_leader(&self, topic: &str, partition: i32) -> Result<String> {
        self.state
            .lock()
            .leaders
            .get(&(topic.to_string(), partition))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("no leader for {topic}/{partition}")))
    }

    async fn set_consumer_offset(
        &self,
        group_id: &str,
        topic: &str,
        partition: i32,
        offset: i64,
    ) -> Result<()> {
        self.state.lock().offsets.insert(
            (group_id.to_string(), topic.to_string(), partition),
            offset,
        );
        Ok(())
    }

    async fn get_consumer_offset(
        &self,
        group_id: &str,
        topic: &str,
        partition: i32,
    ) -> Result<i64> {
        self.state
            .lock()
            .offsets
            .get(&(group_id.to_string(), topic.to_string(), partition))
            .copied()
            .ok_or_else(|| Error::not_found(format!("no committed offset for {group_id}/{topic}/{partition}")))
    }

    async fn assign_partition(
        &self,
        group_id: &str,
        topic: &str,
        partition: i32,
        consumer_id: &str,
    ) -> Result<()> {
        self.state.lock().owners.insert(
            (group_id.to_string(), topic.to_string(), partition),
            consumer_id.to_string(),
        );
        Ok(())
    }

    async fn get_owner(&self, group_id: &str, topic: &str, partition: i32) -> Result<String> {
        self.state
            .lock()
            .owners
            .get(&(group_id.to_string(), topic.to_string(), partition))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("no owner for {group_id}/{topic}/{partition}")))
    }

    async fn sweep_expired_brokers(&self) -> Vec<String> {
        let mut state = self.state.lock();
        let now = Instant::now();
        let expired: Vec<String> = state
            .brokers
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            state.brokers.remove(id);
            info!(broker_id = %id, "evicted expired broker registration");
        }
        expired
    }
}
