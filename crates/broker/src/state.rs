//! Shared state for the Broker Service (spec §4.B).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use qbroker_coordination::CoordinationClient;
use qbroker_log::InMemoryLog;

use crate::config::BrokerConfig;

/// Key identifying one hosted Partition Log.
pub type LogKey = (String, i32);

/// One mutex guards the `(topic, partition) -> Partition Log` map itself;
/// each Partition Log then guards its own offset assignment independently,
/// so no two mutexes are ever held at once (spec §5).
///
/// The map holds the concrete in-process backend rather than `dyn AppendLog`
/// so the retention sweep (a supplement, not part of the Partition Log
/// contract) can reach `InMemoryLog::trim_older_than` directly; a future
/// backend would need its own sweep wiring here too.
#[derive(Clone)]
pub struct BrokerState {
    pub config: Arc<BrokerConfig>,
    pub coordination: Arc<dyn CoordinationClient>,
    logs: Arc<Mutex<HashMap<LogKey, Arc<InMemoryLog>>>>,
    /// Flipped by the shutdown handler so in-flight and future RPCs can be
    /// rejected while the server drains (spec §4.B: "stop accepting new RPCs").
    draining: Arc<AtomicBool>,
}

impl BrokerState {
    pub fn new(config: BrokerConfig, coordination: Arc<dyn CoordinationClient>) -> Self {
        Self {
            config: Arc::new(config),
            coordination,
            logs: Arc::new(Mutex::new(HashMap::new())),
            draining: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn broker_id(&self) -> &str {
        &self.config.broker_id
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    pub fn begin_draining(&self) {
        self.draining.store(true, Ordering::Release);
    }

    /// Returns the Partition Log for `(topic, partition)`, instantiating it
    /// lazily on first produce (spec §3: "Partition Log: instantiated lazily
    /// ... when first produced to").
    pub fn log_for(&self, topic: &str, partition: i32) -> Arc<InMemoryLog> {
        let key = (topic.to_string(), partition);
        let mut logs = self.logs.lock();
        logs.entry(key)
            .or_insert_with(|| Arc::new(InMemoryLog::new()))
            .clone()
    }

    /// Returns the Partition Log for `(topic, partition)` only if it has
    /// already been instantiated; consume does not create logs.
    pub fn existing_log(&self, topic: &str, partition: i32) -> Option<Arc<InMemoryLog>> {
        let key = (topic.to_string(), partition);
        self.logs.lock().get(&key).cloned()
    }

    /// Snapshot of every `(topic, partition)` this broker currently hosts a
    /// log for, used by the retention sweep background task.
    pub fn hosted_partitions(&self) -> Vec<LogKey> {
        self.logs.lock().keys().cloned().collect()
    }
}
