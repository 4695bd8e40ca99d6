//! The `Record` type: the unit of data moving through the broker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable, keyed record produced to a single `(topic, partition)`.
///
/// `offset` is only meaningful once a `Record` has been appended to a
/// Partition Log; records in flight (produced but not yet acknowledged)
/// carry `offset: None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(with = "bytes_as_base64")]
    pub key: Vec<u8>,
    #[serde(with = "bytes_as_base64")]
    pub value: Vec<u8>,
    pub topic: String,
    pub partition: i32,
    /// Producer wall-clock time at enqueue, in milliseconds since the epoch.
    pub timestamp: i64,
    /// Position within the partition log. `None` until appended.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub offset: Option<i64>,
}

impl Record {
    pub fn new(key: Vec<u8>, value: Vec<u8>, topic: impl Into<String>, partition: i32) -> Self {
        Self {
            key,
            value,
            topic: topic.into(),
            partition,
            timestamp: Utc::now().timestamp_millis(),
            offset: None,
        }
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// serde helper: records travel as JSON over HTTP, so raw key/value bytes are
/// base64-encoded rather than emitted as a JSON byte array.
mod bytes_as_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s.as_bytes()).map_err(serde::de::Error::custom)
    }
}
