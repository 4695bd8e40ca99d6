//! Test fixtures: records and topic metadata.

use qbroker_core::{Record, TopicMetadata};

/// A single record with a given key/value against `topic`/`partition`.
pub fn record(key: &str, value: &str, topic: &str, partition: i32) -> Record {
    Record::new(
        key.as_bytes().to_vec(),
        value.as_bytes().to_vec(),
        topic,
        partition,
    )
}

/// `n` records against the same `(topic, partition)`, keyed `k0..kn`.
pub fn records(n: usize, topic: &str, partition: i32) -> Vec<Record> {
    (0..n)
        .map(|i| record(&format!("k{i}"), &format!("v{i}"), topic, partition))
        .collect()
}

/// Topic metadata for a topic with `partitions` partitions.
pub fn topic(name: &str, partitions: i32) -> TopicMetadata {
    TopicMetadata::new(name, partitions)
}
