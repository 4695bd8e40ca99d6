//! Sys-admin operations: broker shutdown (spec §4.B "Shutdown").

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::dto::ShutdownRequest;
use crate::router::Router;
use crate::transport::Transport;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Issues `Shutdown` RPCs against a broker known by id, following at most
/// one redirect if the broker it first reaches is not the one hosting
/// `broker_id` (the broker's `WrongBroker` response carries the hint).
pub struct SysAdmin {
    router: Arc<Router>,
    transport: Transport,
}

impl SysAdmin {
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            transport: Transport::default(),
        }
    }

    /// Resolves `broker_id`'s address through the Router, sends `Shutdown`,
    /// and retries once against the redirect address if the first broker
    /// reached says it isn't the one. Returns whether the broker
    /// acknowledged the shutdown.
    pub async fn shutdown(&self, broker_id: &str) -> bool {
        let address = match self.router.get_broker_address(broker_id).await {
            Ok(address) => address,
            Err(e) => {
                error!(broker_id, error = %e, "could not resolve broker address for shutdown");
                return false;
            }
        };

        match self.send(&address, broker_id).await {
            Ok(resp) if resp.success => {
                info!(broker_id, "broker acknowledged shutdown");
                true
            }
            Ok(resp) => match resp.broker_address {
                Some(redirect) if !redirect.is_empty() => {
                    self.retry(&redirect, broker_id).await
                }
                _ => {
                    error!(broker_id, "broker refused shutdown");
                    false
                }
            },
            Err(e) => {
                error!(broker_id, address = %address, error = %e, "shutdown RPC failed");
                false
            }
        }
    }

    async fn retry(&self, redirect: &str, broker_id: &str) -> bool {
        match self.send(redirect, broker_id).await {
            Ok(resp) if resp.success => {
                info!(broker_id, redirect, "broker acknowledged shutdown after redirect");
                true
            }
            Ok(_) => {
                error!(broker_id, redirect, "redirected broker refused shutdown");
                false
            }
            Err(e) => {
                error!(broker_id, redirect, error = %e, "redirected shutdown RPC failed");
                false
            }
        }
    }

    async fn send(
        &self,
        address: &str,
        broker_id: &str,
    ) -> qbroker_core::Result<crate::dto::ShutdownResponse> {
        let request = ShutdownRequest {
            broker_id: broker_id.to_string(),
        };
        self.transport
            .post(address, "/admin/shutdown", &request, SHUTDOWN_TIMEOUT)
            .await
    }
}
