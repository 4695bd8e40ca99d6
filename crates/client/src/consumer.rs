//! Single-partition fetch primitive over the Router (spec §4.F).

use std::sync::Arc;
use std::time::Duration;

use qbroker_core::Record;
use tracing::error;

use crate::dto::ConsumeRequest;
use crate::router::Router;
use crate::transport::Transport;

const CONSUME_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Consumer {
    router: Arc<Router>,
    transport: Transport,
}

impl Consumer {
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            transport: Transport::default(),
        }
    }

    /// Resolves `(topic, partition)` via the Router, issues one
    /// `ConsumeMessages` RPC, and returns the records (possibly empty). RPC
    /// failures surface as an empty result plus a logged error; the caller
    /// decides whether to retry (spec §4.F).
    pub async fn consume(
        &self,
        group_id: &str,
        topic: &str,
        partition: i32,
        offset: i64,
        max: i32,
    ) -> Vec<Record> {
        let broker_address = match self.router.get_broker_ip(topic, partition).await {
            Ok(addr) => addr,
            Err(e) => {
                error!(group_id, topic, partition, error = %e, "could not resolve broker for consume");
                return Vec::new();
            }
        };

        let request = ConsumeRequest {
            group_id: group_id.to_string(),
            topic: topic.to_string(),
            partition,
            start_offset: offset,
            max_messages: max,
        };

        let result: qbroker_core::Result<crate::dto::ConsumeResponse> = self
            .transport
            .post(&broker_address, "/consume", &request, CONSUME_TIMEOUT)
            .await;

        match result {
            Ok(resp) if resp.success => resp.messages,
            Ok(resp) => {
                error!(group_id, topic, partition, error = ?resp.error_message, "broker rejected consume");
                Vec::new()
            }
            Err(e) => {
                error!(group_id, topic, partition, error = %e, "consume RPC failed");
                Vec::new()
            }
        }
    }
}
