//! Wire DTOs for the Broker Service's HTTP/JSON RPC surface (spec §6).
//!
//! Field names and shapes follow the spec's RPC surface exactly; the
//! encoding itself (JSON over HTTP) is this implementation's concrete
//! realization of the abstractly-specified wire format (see SPEC_FULL §10.4).

use qbroker_core::Record;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ProduceRequest {
    #[validate(length(min = 1))]
    pub producer_id: String,
    pub messages: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub struct ProduceResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConsumeRequest {
    #[validate(length(min = 1))]
    pub group_id: String,
    #[validate(length(min = 1))]
    pub topic: String,
    pub partition: i32,
    #[validate(range(min = 0))]
    pub start_offset: i64,
    #[validate(range(min = 0))]
    pub max_messages: i32,
}

#[derive(Debug, Serialize)]
pub struct ConsumeResponse {
    pub success: bool,
    pub messages: Vec<Record>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MetadataRequest {
    #[validate(length(min = 1))]
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub struct PartitionMetadata {
    pub partition_id: i32,
    pub broker_address: String,
}

#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    pub success: bool,
    pub partitions: Vec<PartitionMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BrokerAddressRequest {
    #[validate(length(min = 1))]
    pub broker_id: String,
}

#[derive(Debug, Serialize)]
pub struct BrokerAddressResponse {
    pub success: bool,
    pub broker_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommitOffsetRequest {
    #[validate(length(min = 1))]
    pub group_id: String,
    #[validate(length(min = 1))]
    pub topic: String,
    pub partition: i32,
    #[validate(range(min = 0))]
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct CommitOffsetResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ShutdownRequest {
    #[validate(length(min = 1))]
    pub broker_id: String,
}

#[derive(Debug, Serialize)]
pub struct ShutdownResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
