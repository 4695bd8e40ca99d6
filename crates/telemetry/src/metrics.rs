//! In-process metrics collection for the broker and client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        for (i, &bound) in Self::BUCKET_BOUNDS.iter().enumerate() {
            if ms <= bound {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        // Value exceeds all buckets, add to last
        self.buckets[10].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for a broker process.
#[derive(Debug, Default)]
pub struct Metrics {
    // Produce path
    pub produce_requests: Counter,
    pub records_appended: Counter,
    pub produce_errors: Counter,

    // Consume path
    pub consume_requests: Counter,
    pub records_served: Counter,
    pub consume_errors: Counter,

    // Router (client-side metadata cache)
    pub metadata_refreshes: Counter,
    pub metadata_refresh_errors: Counter,
    pub wrong_broker_redirects: Counter,

    // Producer batcher
    pub batches_flushed: Counter,
    pub batch_flush_size_trigger: Counter,
    pub batch_flush_linger_trigger: Counter,

    // Coordination / cluster membership
    pub broker_lease_renewals: Counter,
    pub broker_lease_expirations: Counter,
    pub retention_records_evicted: Counter,

    // Latency histograms
    pub produce_latency_ms: Histogram,
    pub consume_latency_ms: Histogram,
    pub metadata_latency_ms: Histogram,

    // Gauges
    pub active_connections: Gauge,
    pub known_brokers: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub produce_requests: u64,
    pub records_appended: u64,
    pub produce_errors: u64,
    pub consume_requests: u64,
    pub records_served: u64,
    pub consume_errors: u64,
    pub metadata_refreshes: u64,
    pub metadata_refresh_errors: u64,
    pub wrong_broker_redirects: u64,
    pub produce_latency_mean_ms: f64,
    pub consume_latency_mean_ms: f64,
    pub metadata_latency_mean_ms: f64,
    pub active_connections: u64,
    pub known_brokers: u64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            produce_requests: self.produce_requests.get(),
            records_appended: self.records_appended.get(),
            produce_errors: self.produce_errors.get(),
            consume_requests: self.consume_requests.get(),
            records_served: self.records_served.get(),
            consume_errors: self.consume_errors.get(),
            metadata_refreshes: self.metadata_refreshes.get(),
            metadata_refresh_errors: self.metadata_refresh_errors.get(),
            wrong_broker_redirects: self.wrong_broker_redirects.get(),
            produce_latency_mean_ms: self.produce_latency_ms.mean(),
            consume_latency_mean_ms: self.consume_latency_ms.mean(),
            metadata_latency_mean_ms: self.metadata_latency_ms.mean(),
            active_connections: self.active_connections.get(),
            known_brokers: self.known_brokers.get(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
