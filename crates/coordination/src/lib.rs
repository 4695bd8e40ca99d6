//! The Coordination Client (spec §4.C): a thin typed facade over a
//! strongly-consistent hierarchical namespace, laid out per spec §6:
//!
//! ```text
//! /topics/<t>                        metadata blob
//! /topics/<t>/<i>                    per-partition node
//! /brokers/<broker_id>                ephemeral: "host:port"
//! /partitions/<t>/<i>/leader          "broker_id"
//! /consumers/<gid>/<t>/<i>/consumer   "consumer_id"
//! /consumers/<gid>/<t>/<i>/offset     "<int64>"
//! ```
//!
//! Leader election and ephemeral-node lifecycle are properties of the
//! backing service in production (ZooKeeper/etcd); this crate defines the
//! client contract and ships an in-process backend that models ephemeral
//! broker registration with an explicit lease TTL instead.

use async_trait::async_trait;
use qbroker_core::{Result, TopicMetadata};

mod memory;
pub use memory::InMemoryCoordination;

/// Namespace operations the broker core needs against the cluster
/// coordinator.
#[async_trait]
pub trait CoordinationClient: Send + Sync {
    /// Idempotent path creation; a repeat call after first success is a
    /// no-op.
    async fn ensure_path(&self, path: &str) -> Result<()>;

    /// Persists topic metadata under `/topics/<name>` and creates
    /// `/topics/<name>/<i>` for each partition. Fails with `Conflict` if the
    /// topic already exists.
    async fn create_topic(&self, metadata: TopicMetadata) -> Result<()>;

    async fn list_partitions(&self, topic: &str) -> Result<Vec<i32>>;

    async fn get_topic(&self, topic: &str) -> Result<TopicMetadata>;

    /// Registers `broker_id -> address` with a lease that must be renewed
    /// via [`CoordinationClient::renew_broker`] before `ttl` elapses, or the
    /// binding is dropped by the next sweep, modeling an ephemeral node.
    async fn register_broker(&self, broker_id: &str, address: &str, ttl_ms: i64) -> Result<()>;

    async fn renew_broker(&self, broker_id: &str, ttl_ms: i64) -> Result<()>;

    async fn resolve_broker(&self, broker_id: &str) -> Result<String>;

    async fn set_partition_leader(&self, topic: &str, partition: i32, broker_id: &str)
        -> Result<()>;

    async fn get_partition_leader(&self, topic: &str, partition: i32) -> Result<String>;

    async fn set_consumer_offset(
        &self,
        group_id: &str,
        topic: &str,
        partition: i32,
        offset: i64,
    ) -> Result<()>;

    async fn get_consumer_offset(&self, group_id: &str, topic: &str, partition: i32)
        -> Result<i64>;

    async fn assign_partition(
        &self,
        group_id: &str,
        topic: &str,
        partition: i32,
        consumer_id: &str,
    ) -> Result<()>;

    async fn get_owner(&self, group_id: &str, topic: &str, partition: i32) -> Result<String>;

    /// Drops any broker registration whose lease has expired. Returns the
    /// broker_ids evicted. Called periodically by a background sweep, not
    /// part of the spec's core contract but needed for the ephemeral-node
    /// semantics it assumes (spec §3: "ephemeral binding that expires on
    /// broker death").
    async fn sweep_expired_brokers(&self) -> Vec<String>;
}
