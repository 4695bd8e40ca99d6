//! Producer Batcher: per-(topic, partition) accumulation with dual flush
//! triggers and orderly shutdown (spec §4.E).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use qbroker_core::{partition_for_key, Record};
use qbroker_telemetry::metrics;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::dto::ProduceRequest;
use crate::router::Router;
use crate::transport::Transport;

const PRODUCE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct BatcherConfig {
    pub producer_id: String,
    pub flush_threshold: usize,
    pub flush_interval_ms: u64,
}

/// An ordered, per-`(topic, partition)` buffer. Order within a bucket is
/// the observed per-partition order at the broker (spec §4.E "Ordering
/// invariant"); the batcher never reorders within a bucket.
#[derive(Default)]
struct Bucket {
    records: Vec<Record>,
}

/// Buffers records per `(topic, partition)` and flushes on a size
/// threshold or a background time interval, dispatching flushed batches to
/// the broker that leads each partition.
pub struct ProducerBatcher {
    config: BatcherConfig,
    router: Arc<Router>,
    transport: Transport,
    /// The single mutex guarding the bucket map (spec §5 "Batcher's bucket
    /// map"). Held only to extract a batch, never across the dispatch RPC.
    buckets: Mutex<HashMap<(String, i32), Bucket>>,
}

impl ProducerBatcher {
    pub fn new(config: BatcherConfig, router: Arc<Router>) -> Arc<Self> {
        Arc::new(Self {
            config,
            router,
            transport: Transport::default(),
            buckets: Mutex::new(HashMap::new()),
        })
    }

    /// Resolves `topic`'s partition via the stable hash of `key`, buffers
    /// the record, and flushes synchronously if the bucket has just reached
    /// `flush_threshold`. Returns whether the record was accepted into a
    /// buffer, not whether it was persisted at a broker (spec §4.E).
    pub async fn produce(self: &Arc<Self>, key: Vec<u8>, value: Vec<u8>, topic: &str) -> bool {
        let partition_count = match self.router.partition_count(topic) {
            Some(count) => count,
            None => match self.router.get_broker_ip(topic, 0).await {
                Ok(_) => match self.router.partition_count(topic) {
                    Some(count) => count,
                    None => return false,
                },
                Err(_) => return false,
            },
        };

        if partition_count <= 0 {
            return false;
        }

        let partition = partition_for_key(&key, partition_count);
        let record = Record::new(key, value, topic, partition);

        let flushed = {
            let mut buckets = self.buckets.lock();
            let bucket = buckets.entry((topic.to_string(), partition)).or_default();
            bucket.records.push(record);
            if bucket.records.len() >= self.config.flush_threshold {
                Some(std::mem::take(&mut bucket.records))
            } else {
                None
            }
        };

        if let Some(batch) = flushed {
            metrics().batch_flush_size_trigger.inc();
            self.dispatch(topic, partition, batch).await;
        }

        true
    }

    /// Flushes every non-empty bucket, dispatching each in parallel and
    /// joining before returning (spec §4.E "Time-based" and "Shutdown").
    pub async fn flush_all(self: &Arc<Self>) {
        let drained: Vec<((String, i32), Vec<Record>)> = {
            let mut buckets = self.buckets.lock();
            buckets
                .iter_mut()
                .filter(|(_, b)| !b.records.is_empty())
                .map(|(key, b)| (key.clone(), std::mem::take(&mut b.records)))
                .collect()
        };

        if drained.is_empty() {
            return;
        }

        let dispatches = drained.into_iter().map(|((topic, partition), batch)| {
            let this = self.clone();
            async move { this.dispatch(&topic, partition, batch).await }
        });
        futures_lite_join_all(dispatches).await;
    }

    async fn dispatch(&self, topic: &str, partition: i32, batch: Vec<Record>) {
        let count = batch.len();
        let broker_address = match self.router.get_broker_ip(topic, partition).await {
            Ok(addr) => addr,
            Err(e) => {
                error!(topic, partition, error = %e, "could not resolve broker for flush");
                return;
            }
        };

        let request = ProduceRequest {
            producer_id: self.config.producer_id.clone(),
            messages: batch,
        };

        let result: qbroker_core::Result<crate::dto::ProduceResponse> = self
            .transport
            .post(&broker_address, "/produce", &request, PRODUCE_TIMEOUT)
            .await;

        match result {
            Ok(resp) if resp.success => {
                metrics().batches_flushed.inc();
                info!(topic, partition, count, broker = %broker_address, "flushed batch");
            }
            Ok(resp) => {
                error!(topic, partition, count, error = ?resp.error_message, "broker rejected batch");
            }
            Err(e) => {
                error!(topic, partition, count, error = %e, "failed to dispatch batch");
            }
        }
    }

    /// Launches the background flush ticker. Every `flush_interval_ms`, all
    /// non-empty buckets are flushed in parallel; dispatches are joined
    /// before the next tick (spec §4.E "Time-based").
    pub fn start_flush_ticker(self: &Arc<Self>, stop: CancellationToken) -> JoinHandle<()> {
        let batcher = self.clone();
        let interval_ms = self.config.flush_interval_ms;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
            loop {
                tokio::select! {
                    _ = stop.cancelled() => return,
                    _ = ticker.tick() => {
                        metrics().batch_flush_linger_trigger.inc();
                        batcher.flush_all().await;
                    }
                }
            }
        })
    }

    /// Performs one final flush of every non-empty bucket. Returning
    /// guarantees no buffered record remains (spec §4.E "Shutdown").
    pub async fn shutdown(self: &Arc<Self>) {
        self.flush_all().await;
    }
}

/// Small join-all helper so this crate doesn't need a `futures` dependency
/// just for one call site.
async fn futures_lite_join_all<F: std::future::Future<Output = ()>>(
    iter: impl IntoIterator<Item = F>,
) {
    let handles: Vec<_> = iter
        .into_iter()
        .map(|fut| tokio::spawn(fut))
        .collect();
    for handle in handles {
        let _ = handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_preserves_enqueue_order() {
        let mut bucket = Bucket::default();
        for n in 0..5u8 {
            bucket
                .records
                .push(Record::new(vec![n], vec![n], "t", 0));
        }
        let values: Vec<u8> = bucket.records.iter().map(|r| r.value[0]).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4]);
    }
}
