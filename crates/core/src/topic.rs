//! Topic metadata shared between the broker, the coordination client, and
//! client-side components.

use serde::{Deserialize, Serialize};

/// Opaque topic attributes persisted through the Coordination Client.
///
/// `partitions` is fixed at creation time; `retention_ms` and
/// `replication_factor` are carried as metadata only (this core does not
/// implement replication, see Non-goals) and retention enforcement is a
/// best-effort background sweep (see `qbroker_broker::retention`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicMetadata {
    pub name: String,
    pub partitions: i32,
    pub retention_ms: i64,
    pub replication_factor: i32,
}

impl TopicMetadata {
    pub fn new(name: impl Into<String>, partitions: i32) -> Self {
        Self {
            name: name.into(),
            partitions,
            retention_ms: 7 * 24 * 60 * 60 * 1000,
            replication_factor: 1,
        }
    }

    pub fn with_retention_ms(mut self, retention_ms: i64) -> Self {
        self.retention_ms = retention_ms;
        self
    }

    pub fn with_replication_factor(mut self, factor: i32) -> Self {
        self.replication_factor = factor;
        self
    }

    /// Serializes to the `"partitions:N,retention:R,replicas:K"` blob format
    /// the coordination namespace stores at `/topics/<name>` (see spec §6).
    pub fn encode(&self) -> String {
        format!(
            "partitions:{},retention:{},replicas:{}",
            self.partitions, self.retention_ms, self.replication_factor
        )
    }

    pub fn decode(name: impl Into<String>, blob: &str) -> crate::Result<Self> {
        let mut partitions = None;
        let mut retention_ms = None;
        let mut replication_factor = None;

        for field in blob.split(',') {
            let (key, value) = field
                .split_once(':')
                .ok_or_else(|| crate::Error::backend(format!("malformed topic blob: {blob}")))?;
            let parsed: i64 = value
                .parse()
                .map_err(|_| crate::Error::backend(format!("malformed topic blob: {blob}")))?;
            match key {
                "partitions" => partitions = Some(parsed as i32),
                "retention" => retention_ms = Some(parsed),
                "replicas" => replication_factor = Some(parsed as i32),
                _ => {}
            }
        }

        Ok(Self {
            name: name.into(),
            partitions: partitions
                .ok_or_else(|| crate::Error::backend("topic blob missing partitions"))?,
            retention_ms: retention_ms.unwrap_or(7 * 24 * 60 * 60 * 1000),
            replication_factor: replication_factor.unwrap_or(1),
        })
    }
}
