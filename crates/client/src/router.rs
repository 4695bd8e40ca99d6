//! Client-side metadata cache with bootstrap failover and periodic refresh
//! (spec §4.D).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use qbroker_core::{Error, Result};
use qbroker_telemetry::metrics;
use rand::seq::SliceRandom;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::dto::{MetadataRequest, MetadataResponse};
use crate::transport::Transport;

const METADATA_TIMEOUT: Duration = Duration::from_secs(5);
const BOOTSTRAP_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Default)]
struct RoutingTable {
    /// `topic -> (partition_id -> broker_address)`.
    partitions: HashMap<String, HashMap<i32, String>>,
    /// `topic -> partition_count`.
    partition_counts: HashMap<String, i32>,
}

/// Client-side cache mapping `(topic, partition) -> broker_address`, with
/// bootstrap failover and a background refresher.
///
/// The routing table is guarded by a single mutex held only across cache
/// reads/writes, never across network I/O (spec §4.D "Concurrency").
pub struct Router {
    transport: Transport,
    table: Mutex<RoutingTable>,
    /// The bootstrap broker currently bound for outbound RPCs. Swapped on
    /// reconnect (spec §4.D "Reconnect policy").
    bound_bootstrap: Mutex<String>,
    bootstraps: Vec<String>,
}

impl Router {
    /// Picks a uniformly random permutation of `bootstraps` and binds to the
    /// first one that answers a liveness probe. Fails fast with
    /// [`Error::NoBootstrap`] if none are reachable.
    pub async fn connect(bootstraps: Vec<String>) -> Result<Arc<Self>> {
        if bootstraps.is_empty() {
            return Err(Error::NoBootstrap);
        }

        let transport = Transport::default();
        let mut candidates = bootstraps.clone();
        candidates.shuffle(&mut rand::thread_rng());

        for candidate in &candidates {
            if transport.is_reachable(candidate, BOOTSTRAP_PROBE_TIMEOUT).await {
                debug!(bootstrap = %candidate, "router bound to bootstrap broker");
                return Ok(Arc::new(Self {
                    transport,
                    table: Mutex::new(RoutingTable::default()),
                    bound_bootstrap: Mutex::new(candidate.clone()),
                    bootstraps,
                }));
            }
        }

        Err(Error::NoBootstrap)
    }

    /// Builds a Router with no bound bootstrap, for tests of layers above
    /// the Router (Batcher bucket logic, Consumer Group membership) that
    /// never need it to actually dial out.
    #[cfg(test)]
    pub(crate) fn new_unconnected() -> Self {
        Self {
            transport: Transport::default(),
            table: Mutex::new(RoutingTable::default()),
            bound_bootstrap: Mutex::new(String::new()),
            bootstraps: Vec::new(),
        }
    }

    fn bound(&self) -> String {
        self.bound_bootstrap.lock().clone()
    }

    /// Retries once against the currently bound bootstrap; on a second
    /// failure rotates to a new random bootstrap and reissues once more
    /// (spec §4.D "Reconnect policy").
    async fn fetch_metadata(&self, topic: &str) -> Result<MetadataResponse> {
        let request = MetadataRequest {
            topic: topic.to_string(),
        };

        let first_target = self.bound();
        match self
            .transport
            .post(&first_target, "/metadata", &request, METADATA_TIMEOUT)
            .await
        {
            Ok(resp) => return Ok(resp),
            Err(e) => warn!(bootstrap = %first_target, error = %e, "metadata RPC failed, retrying"),
        }

        match self
            .transport
            .post(&first_target, "/metadata", &request, METADATA_TIMEOUT)
            .await
        {
            Ok(resp) => return Ok(resp),
            Err(e) => warn!(bootstrap = %first_target, error = %e, "metadata retry failed, rotating bootstrap"),
        }

        let mut candidates: Vec<&String> = self
            .bootstraps
            .iter()
            .filter(|b| **b != first_target)
            .collect();
        candidates.shuffle(&mut rand::thread_rng());

        for candidate in candidates {
            match self
                .transport
                .post(candidate, "/metadata", &request, METADATA_TIMEOUT)
                .await
            {
                Ok(resp) => {
                    *self.bound_bootstrap.lock() = candidate.clone();
                    return Ok(resp);
                }
                Err(e) => warn!(bootstrap = %candidate, error = %e, "metadata RPC failed on rotated bootstrap"),
            }
        }

        Err(Error::NoBootstrap)
    }

    fn merge_metadata(&self, topic: &str, response: &MetadataResponse) {
        let mut table = self.table.lock();
        let entry = table.partitions.entry(topic.to_string()).or_default();
        for p in &response.partitions {
            entry.insert(p.partition_id, p.broker_address.clone());
        }
        table
            .partition_counts
            .insert(topic.to_string(), response.partitions.len() as i32);
    }

    /// On hit, returns the cached address. On miss, synchronously fetches
    /// metadata for `topic`, populates the cache, and retries the lookup
    /// once (spec §4.D).
    pub async fn get_broker_ip(&self, topic: &str, partition: i32) -> Result<String> {
        if let Some(address) = self.cached(topic, partition) {
            return Ok(address);
        }

        let response = self.fetch_metadata(topic).await?;
        if !response.success {
            return Err(Error::not_found(
                response
                    .error_message
                    .unwrap_or_else(|| format!("unknown topic: {topic}")),
            ));
        }
        self.merge_metadata(topic, &response);

        self.cached(topic, partition)
            .ok_or_else(|| Error::not_found(format!("no broker for {topic}/{partition}")))
    }

    fn cached(&self, topic: &str, partition: i32) -> Option<String> {
        self.table
            .lock()
            .partitions
            .get(topic)
            .and_then(|m| m.get(&partition))
            .cloned()
    }

    /// Not cached: always round-trips to the bound bootstrap's
    /// `GetBrokerAddress` (spec §4.D).
    pub async fn get_broker_address(&self, broker_id: &str) -> Result<String> {
        let target = self.bound();
        let response: crate::dto::BrokerAddressResponse = self
            .transport
            .get(&target, &format!("/brokers/{broker_id}"), METADATA_TIMEOUT)
            .await?;

        if response.success {
            Ok(response.broker_address)
        } else {
            Err(Error::not_found(
                response
                    .error_message
                    .unwrap_or_else(|| format!("unknown broker_id: {broker_id}")),
            ))
        }
    }

    pub fn partition_count(&self, topic: &str) -> Option<i32> {
        self.table.lock().partition_counts.get(topic).copied()
    }

    /// Launches a background task that, every `interval`, refetches
    /// metadata for every topic currently in the cache.
    pub fn start_periodic_refresh(
        self: &Arc<Self>,
        interval: Duration,
        stop: CancellationToken,
    ) -> JoinHandle<()> {
        let router = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = stop.cancelled() => return,
                    _ = ticker.tick() => {
                        let topics: Vec<String> = {
                            router.table.lock().partitions.keys().cloned().collect()
                        };
                        for topic in topics {
                            match router.fetch_metadata(&topic).await {
                                Ok(response) if response.success => {
                                    metrics().metadata_refreshes.inc();
                                    router.merge_metadata(&topic, &response)
                                }
                                Ok(response) => {
                                    metrics().metadata_refresh_errors.inc();
                                    warn!(topic = %topic, error = ?response.error_message, "periodic refresh failed")
                                }
                                Err(e) => {
                                    metrics().metadata_refresh_errors.inc();
                                    warn!(topic = %topic, error = %e, "periodic refresh RPC failed")
                                }
                            }
                        }
                    }
                }
            }
        })
    }
}
