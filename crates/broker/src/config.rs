//! Broker Service configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Stable identity registered with the coordinator. Does not change
    /// across restarts even though `advertised_address` might.
    #[serde(default = "default_broker_id")]
    pub broker_id: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// `host:port` other brokers/clients should dial, registered with the
    /// coordinator. Defaults to `host:port` but may differ behind a proxy.
    pub advertised_address: Option<String>,
    /// Coordinator registration lease length; the broker renews it on
    /// `lease_renew_interval_ms`.
    #[serde(default = "default_lease_ttl_ms")]
    pub lease_ttl_ms: i64,
    #[serde(default = "default_lease_renew_interval_ms")]
    pub lease_renew_interval_ms: u64,
    #[serde(default = "default_retention_sweep_interval_ms")]
    pub retention_sweep_interval_ms: u64,
}

fn default_broker_id() -> String {
    "broker-0".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7000
}

fn default_lease_ttl_ms() -> i64 {
    30_000
}

fn default_lease_renew_interval_ms() -> u64 {
    10_000
}

fn default_retention_sweep_interval_ms() -> u64 {
    3_600_000
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            broker_id: default_broker_id(),
            host: default_host(),
            port: default_port(),
            advertised_address: None,
            lease_ttl_ms: default_lease_ttl_ms(),
            lease_renew_interval_ms: default_lease_renew_interval_ms(),
            retention_sweep_interval_ms: default_retention_sweep_interval_ms(),
        }
    }
}

impl BrokerConfig {
    pub fn advertised_address(&self) -> String {
        self.advertised_address
            .clone()
            .unwrap_or_else(|| format!("{}:{}", self.host, self.port))
    }
}
