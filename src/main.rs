//! Broker daemon (`qbrokerd`)
//!
//! Hosts one Broker Service: HTTP/JSON RPC surface over the partition logs
//! this broker leads, coordinator lease renewal, and retention sweeping.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use qbroker_broker::{background, router, BrokerConfig, BrokerState};
use qbroker_coordination::{CoordinationClient, InMemoryCoordination};
use qbroker_telemetry::{health, init_tracing_from_env};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing_from_env();

    info!("Starting broker v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    info!(
        broker_id = %config.broker_id,
        advertised_address = %config.advertised_address(),
        "loaded broker config"
    );

    let coordination: Arc<dyn CoordinationClient> = Arc::new(InMemoryCoordination::new());
    coordination
        .register_broker(
            &config.broker_id,
            &config.advertised_address(),
            config.lease_ttl_ms,
        )
        .await
        .context("failed to register broker with coordinator")?;
    health().coordination.set_healthy();

    let state = BrokerState::new(config.clone(), coordination);
    let app = router(state.clone());

    let stop = CancellationToken::new();
    let mut background_handles = background::start(state.clone(), stop.clone());
    background_handles.push(tokio::spawn(background::run_broker_sweep(
        state.clone(),
        stop.clone(),
        config.lease_renew_interval_ms,
    )));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid server address")?;

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutting down");
    stop.cancel();
    for handle in background_handles {
        if let Err(e) = handle.await {
            error!(error = %e, "background task panicked during shutdown");
        }
    }

    info!("shutdown complete");
    Ok(())
}

/// Loads `BrokerConfig` from defaults, an optional `config/default.toml`,
/// then `QBROKER_BROKER__*` environment overrides.
fn load_config() -> Result<BrokerConfig> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&BrokerConfig::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("QBROKER_BROKER")
                .try_parsing(true),
        )
        .build()
        .context("failed to build configuration")?;

    config
        .try_deserialize()
        .context("failed to deserialize configuration")
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C signal"),
        _ = terminate => info!("received terminate signal"),
    }
}
