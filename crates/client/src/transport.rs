//! Thin RPC transport: one shared `reqwest::Client` issuing JSON/HTTP calls
//! against a broker's wire surface (spec §6). Network failures are mapped
//! to [`qbroker_core::Error::Transport`] uniformly so the Router's retry
//! and bootstrap-rotation policy (spec §4.D) can match on error kind alone.

use std::time::Duration;

use qbroker_core::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};

#[derive(Clone)]
pub struct Transport {
    client: reqwest::Client,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl Transport {
    pub fn new(default_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(default_timeout)
            .build()
            .expect("reqwest client build with static config cannot fail");
        Self { client }
    }

    pub async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        broker_address: &str,
        path: &str,
        body: &Req,
        deadline: Duration,
    ) -> Result<Resp> {
        let url = format!("http://{broker_address}{path}");
        let response = self
            .client
            .post(&url)
            .timeout(deadline)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::transport(format!("POST {url}: {e}")))?;

        response
            .json::<Resp>()
            .await
            .map_err(|e| Error::transport(format!("decode response from {url}: {e}")))
    }

    pub async fn get<Resp: DeserializeOwned>(
        &self,
        broker_address: &str,
        path: &str,
        deadline: Duration,
    ) -> Result<Resp> {
        let url = format!("http://{broker_address}{path}");
        let response = self
            .client
            .get(&url)
            .timeout(deadline)
            .send()
            .await
            .map_err(|e| Error::transport(format!("GET {url}: {e}")))?;

        response
            .json::<Resp>()
            .await
            .map_err(|e| Error::transport(format!("decode response from {url}: {e}")))
    }

    /// Lightweight liveness probe used by the Router to pick a reachable
    /// bootstrap broker (spec §4.D "tries each in order until one RPC
    /// channel is established").
    pub async fn is_reachable(&self, broker_address: &str, deadline: Duration) -> bool {
        let url = format!("http://{broker_address}/health/live");
        self.client
            .get(&url)
            .timeout(deadline)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}
