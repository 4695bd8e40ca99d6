//! HTTP handlers realizing the spec's abstractly-specified RPC surface
//! (spec §6) as JSON-over-HTTP (see SPEC_FULL §10.4).
//!
//! Every handler embeds domain failures (`NotFound`, `WrongBroker`,
//! `Backend`, ...) in the response body as `success=false` plus
//! `error_message`, per spec §7; HTTP status stays 200 for those. Only
//! malformed requests (failing DTO validation) produce a 400.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use qbroker_telemetry::{health, metrics};
use std::time::Instant;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use validator::Validate;

use crate::dto::*;
use crate::service;
use crate::state::BrokerState;

pub fn router(state: BrokerState) -> Router {
    Router::new()
        .route("/produce", post(produce_handler))
        .route("/consume", post(consume_handler))
        .route("/metadata", post(metadata_handler))
        .route("/brokers/:broker_id", get(broker_address_handler))
        .route("/offsets/commit", post(commit_offset_handler))
        .route("/admin/shutdown", post(shutdown_handler))
        .route("/health", get(health_handler))
        .route("/health/ready", get(ready_handler))
        .route("/health/live", get(live_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

struct ValidationRejection(String);

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.0).into_response()
    }
}

fn validate<T: Validate>(dto: &T) -> Result<(), ValidationRejection> {
    dto.validate()
        .map_err(|e| ValidationRejection(e.to_string()))
}

const DRAINING_MESSAGE: &str = "broker is draining, route to another broker";

async fn produce_handler(
    State(state): State<BrokerState>,
    Json(req): Json<ProduceRequest>,
) -> Result<Json<ProduceResponse>, ValidationRejection> {
    validate(&req)?;
    if state.is_draining() {
        return Ok(Json(ProduceResponse {
            success: false,
            error_message: Some(DRAINING_MESSAGE.to_string()),
        }));
    }
    let start = Instant::now();
    metrics().produce_requests.inc();
    let message_count = req.messages.len() as u64;

    let response = match service::produce(&state, &req.producer_id, req.messages).await {
        Ok(()) => {
            metrics().records_appended.inc_by(message_count);
            ProduceResponse {
                success: true,
                error_message: None,
            }
        }
        Err(e) => {
            metrics().produce_errors.inc();
            if matches!(e, qbroker_core::Error::WrongBroker { .. }) {
                metrics().wrong_broker_redirects.inc();
            }
            ProduceResponse {
                success: false,
                error_message: Some(e.to_string()),
            }
        }
    };

    metrics()
        .produce_latency_ms
        .observe(start.elapsed().as_millis() as u64);
    Ok(Json(response))
}

async fn consume_handler(
    State(state): State<BrokerState>,
    Json(req): Json<ConsumeRequest>,
) -> Result<Json<ConsumeResponse>, ValidationRejection> {
    validate(&req)?;
    if state.is_draining() {
        return Ok(Json(ConsumeResponse {
            success: false,
            messages: Vec::new(),
            error_message: Some(DRAINING_MESSAGE.to_string()),
        }));
    }
    let start = Instant::now();
    metrics().consume_requests.inc();

    let response = match service::consume(
        &state,
        &req.group_id,
        &req.topic,
        req.partition,
        req.start_offset,
        req.max_messages,
    )
    .await
    {
        Ok(messages) => {
            metrics().records_served.inc_by(messages.len() as u64);
            ConsumeResponse {
                success: true,
                messages,
                error_message: None,
            }
        }
        Err(e) => {
            metrics().consume_errors.inc();
            ConsumeResponse {
                success: false,
                messages: Vec::new(),
                error_message: Some(e.to_string()),
            }
        }
    };

    metrics()
        .consume_latency_ms
        .observe(start.elapsed().as_millis() as u64);
    Ok(Json(response))
}

async fn metadata_handler(
    State(state): State<BrokerState>,
    Json(req): Json<MetadataRequest>,
) -> Result<Json<MetadataResponse>, ValidationRejection> {
    validate(&req)?;
    let start = Instant::now();

    let response = match service::get_metadata(&state, &req.topic).await {
        Ok((_, partitions)) => MetadataResponse {
            success: true,
            partitions: partitions
                .into_iter()
                .map(|(partition_id, broker_address)| PartitionMetadata {
                    partition_id,
                    broker_address,
                })
                .collect(),
            error_message: None,
        },
        Err(e) => MetadataResponse {
            success: false,
            partitions: Vec::new(),
            error_message: Some(e.to_string()),
        },
    };

    metrics()
        .metadata_latency_ms
        .observe(start.elapsed().as_millis() as u64);
    Ok(Json(response))
}

async fn broker_address_handler(
    State(state): State<BrokerState>,
    Path(broker_id): Path<String>,
) -> Json<BrokerAddressResponse> {
    Json(match service::get_broker_address(&state, &broker_id).await {
        Ok(broker_address) => BrokerAddressResponse {
            success: true,
            broker_address,
            error_message: None,
        },
        Err(e) => BrokerAddressResponse {
            success: false,
            broker_address: String::new(),
            error_message: Some(e.to_string()),
        },
    })
}

async fn commit_offset_handler(
    State(state): State<BrokerState>,
    Json(req): Json<CommitOffsetRequest>,
) -> Result<Json<CommitOffsetResponse>, ValidationRejection> {
    validate(&req)?;
    if state.is_draining() {
        return Ok(Json(CommitOffsetResponse {
            success: false,
            error_message: Some(DRAINING_MESSAGE.to_string()),
        }));
    }
    Ok(Json(
        match service::commit_offset(&state, &req.group_id, &req.topic, req.partition, req.offset)
            .await
        {
            Ok(()) => CommitOffsetResponse {
                success: true,
                error_message: None,
            },
            Err(e) => CommitOffsetResponse {
                success: false,
                error_message: Some(e.to_string()),
            },
        },
    ))
}

async fn shutdown_handler(
    State(state): State<BrokerState>,
    Json(req): Json<ShutdownRequest>,
) -> Result<Json<ShutdownResponse>, ValidationRejection> {
    validate(&req)?;
    Ok(Json(match service::shutdown(&state, &req.broker_id).await {
        Ok(service::ShutdownOutcome::Accepted) => ShutdownResponse {
            success: true,
            broker_address: None,
            error_message: None,
        },
        Ok(service::ShutdownOutcome::Redirect(address)) => ShutdownResponse {
            success: false,
            broker_address: Some(address),
            error_message: None,
        },
        Err(e) => ShutdownResponse {
            success: false,
            broker_address: None,
            error_message: Some(e.to_string()),
        },
    }))
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: String,
    coordination_connected: bool,
    known_brokers: u64,
}

async fn health_handler(State(_state): State<BrokerState>) -> Json<HealthResponse> {
    let report = health().report();
    Json(HealthResponse {
        status: format!("{:?}", report.status).to_lowercase(),
        coordination_connected: health().coordination.is_healthy(),
        known_brokers: metrics().known_brokers.get(),
    })
}

async fn ready_handler(State(state): State<BrokerState>) -> StatusCode {
    if health().is_ready() && !state.is_draining() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn live_handler() -> StatusCode {
    if health().is_alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
