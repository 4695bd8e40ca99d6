//! Membership, ownership, and per-partition offset tracking on top of
//! [`crate::consumer::Consumer`] (spec §4.G).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use qbroker_core::Record;
use tracing::error;

use crate::consumer::Consumer;
use crate::dto::CommitOffsetRequest;
use crate::router::Router;
use crate::transport::Transport;

/// One claimed partition at join time: `(topic, partition, initial_offset)`.
pub type Claim = (String, i32, i64);

#[derive(Default)]
struct Membership {
    members: HashSet<String>,
    /// `(topic, partition) -> consumer_id`; at most one owner per key.
    ownership: HashMap<(String, i32), String>,
    /// `(topic, partition) -> next_offset`, valid only while owned.
    next_offset: HashMap<(String, i32), i64>,
}

/// A set of consumers partitioning the work of reading a topic, with
/// per-partition exclusive ownership.
///
/// Membership, ownership, and offsets live behind a single mutex (spec §5
/// "Consumer Group's membership+ownership+offset tables"); the owning
/// Consumer's RPC always happens outside the lock.
pub struct ConsumerGroup {
    group_id: String,
    consumer: Consumer,
    state: Mutex<Membership>,
    /// When set, each advance is additionally persisted through the
    /// broker's optional `CommitOffset` RPC (spec §6, §9; the source never
    /// wires this, and the spec leaves it optional rather than mandatory).
    persist_offsets: bool,
    router: Arc<Router>,
    transport: Transport,
}

impl ConsumerGroup {
    pub fn new(group_id: impl Into<String>, router: Arc<Router>, persist_offsets: bool) -> Self {
        Self {
            group_id: group_id.into(),
            consumer: Consumer::new(router.clone()),
            state: Mutex::new(Membership::default()),
            persist_offsets,
            router,
            transport: Transport::default(),
        }
    }

    /// Rejects if `consumer_id` is already a member, or if any claimed
    /// `(topic, partition)` is already owned within this group. On success,
    /// records ownership and initial offset for every claim (spec §4.G).
    ///
    /// Claims arrive pre-zipped as `(topic, partition, initial_offset)`
    /// triples; the source's parallel `topics[]`/`partitions[]`/`offsets[]`
    /// arrays are read pairwise, not as a cartesian product (spec §9).
    pub fn add_consumer(&self, consumer_id: &str, claims: Vec<Claim>) -> bool {
        let mut state = self.state.lock();

        if state.members.contains(consumer_id) {
            return false;
        }
        if claims
            .iter()
            .any(|(topic, partition, _)| state.ownership.contains_key(&(topic.clone(), *partition)))
        {
            return false;
        }

        state.members.insert(consumer_id.to_string());
        for (topic, partition, initial_offset) in claims {
            state
                .ownership
                .insert((topic.clone(), partition), consumer_id.to_string());
            state.next_offset.insert((topic, partition), initial_offset);
        }
        true
    }

    /// Removes the member and releases every partition it owned.
    pub fn remove_consumer(&self, consumer_id: &str) -> bool {
        let mut state = self.state.lock();
        if !state.members.remove(consumer_id) {
            return false;
        }
        let owned: Vec<(String, i32)> = state
            .ownership
            .iter()
            .filter(|(_, owner)| owner.as_str() == consumer_id)
            .map(|(key, _)| key.clone())
            .collect();
        for key in owned {
            state.ownership.remove(&key);
            state.next_offset.remove(&key);
        }
        true
    }

    /// Looks up the owning consumer for `(topic, partition)`; fetches from
    /// `next_offset`; advances `next_offset` by the number of records
    /// returned (spec §4.G "Fetch API"). Returns empty with a logged error
    /// if the partition is unowned in this group.
    pub async fn consume(&self, topic: &str, partition: i32, max_messages: i32) -> Vec<Record> {
        let key = (topic.to_string(), partition);
        let next_offset = {
            let state = self.state.lock();
            if !state.ownership.contains_key(&key) {
                error!(group_id = %self.group_id, topic, partition, "consume on unowned partition");
                return Vec::new();
            }
            *state.next_offset.get(&key).expect("ownership implies offset entry")
        };

        let records = self
            .consumer
            .consume(&self.group_id, topic, partition, next_offset, max_messages)
            .await;

        if !records.is_empty() {
            let advanced = next_offset + records.len() as i64;
            self.state.lock().next_offset.insert(key, advanced);

            if self.persist_offsets {
                self.commit(topic, partition, advanced).await;
            }
        }

        records
    }

    async fn commit(&self, topic: &str, partition: i32, offset: i64) {
        let broker_address = match self.router.get_broker_ip(topic, partition).await {
            Ok(addr) => addr,
            Err(e) => {
                error!(group_id = %self.group_id, topic, partition, error = %e, "could not resolve broker to commit offset");
                return;
            }
        };

        let request = CommitOffsetRequest {
            group_id: self.group_id.clone(),
            topic: topic.to_string(),
            partition,
            offset,
        };

        let result: qbroker_core::Result<crate::dto::CommitOffsetResponse> = self
            .transport
            .post(&broker_address, "/offsets/commit", &request, std::time::Duration::from_secs(5))
            .await;

        if let Err(e) = result {
            error!(group_id = %self.group_id, topic, partition, error = %e, "offset commit RPC failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> ConsumerGroup {
        // Built without dialing a real bootstrap; these tests only exercise
        // membership/ownership bookkeeping, which never touches the network.
        let router = Arc::new(Router::new_unconnected());
        ConsumerGroup::new("g1", router, false)
    }

    #[test]
    fn add_consumer_rejects_duplicate_ownership() {
        let group = group();
        assert!(group.add_consumer("c1", vec![("t".to_string(), 0, 0)]));
        assert!(!group.add_consumer("c2", vec![("t".to_string(), 0, 0)]));
    }

    #[test]
    fn add_consumer_rejects_duplicate_member() {
        let group = group();
        assert!(group.add_consumer("c1", vec![("t".to_string(), 0, 0)]));
        assert!(!group.add_consumer("c1", vec![("t".to_string(), 1, 0)]));
    }

    #[test]
    fn remove_consumer_releases_ownership() {
        let group = group();
        group.add_consumer("c1", vec![("t".to_string(), 0, 0)]);
        assert!(group.remove_consumer("c1"));

        let state = group.state.lock();
        assert!(state.ownership.is_empty());
        assert!(state.next_offset.is_empty());
    }

    #[test]
    fn remove_unknown_consumer_is_false() {
        let group = group();
        assert!(!group.remove_consumer("ghost"));
    }
}
