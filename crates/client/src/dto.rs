//! Client-side mirrors of the broker's wire shapes (spec §6). Kept
//! independent of `qbroker-broker`'s own DTOs so the client crate only
//! depends on the shared `qbroker-core` types and the wire contract, not on
//! the broker's implementation.

use qbroker_core::Record;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ProduceRequest {
    pub producer_id: String,
    pub messages: Vec<Record>,
}

#[derive(Debug, Deserialize)]
pub struct ProduceResponse {
    pub success: bool,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConsumeRequest {
    pub group_id: String,
    pub topic: String,
    pub partition: i32,
    pub start_offset: i64,
    pub max_messages: i32,
}

#[derive(Debug, Deserialize)]
pub struct ConsumeResponse {
    pub success: bool,
    pub messages: Vec<Record>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MetadataRequest {
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct PartitionMetadata {
    pub partition_id: i32,
    pub broker_address: String,
}

#[derive(Debug, Deserialize)]
pub struct MetadataResponse {
    pub success: bool,
    pub partitions: Vec<PartitionMetadata>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BrokerAddressResponse {
    pub success: bool,
    pub broker_address: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommitOffsetRequest {
    pub group_id: String,
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

#[derive(Debug, Deserialize)]
pub struct CommitOffsetResponse {
    pub success: bool,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShutdownRequest {
    pub broker_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ShutdownResponse {
    pub success: bool,
    #[serde(default)]
    pub broker_address: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}
