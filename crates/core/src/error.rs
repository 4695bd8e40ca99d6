//! Unified error taxonomy for the broker core.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type shared by every core crate.
///
/// Variants map onto the kinds a caller needs to branch on (per the error
/// taxonomy), not onto where in the stack the error originated.
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// RPC channel failure or deadline expiry. Recovered locally by the
    /// Router (one retry, then bootstrap rotation) where possible.
    #[error("transport error: {0}")]
    Transport(String),

    /// Unknown topic, partition, broker_id, or consumer-group ownership.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate consumer_id, or a `(topic, partition)` already owned within
    /// a group.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Every bootstrap broker was unreachable.
    #[error("no bootstrap broker reachable")]
    NoBootstrap,

    /// The underlying append-only store rejected a read or write.
    #[error("backend error: {0}")]
    Backend(String),

    /// A produce was addressed to a broker that is not the partition leader.
    /// Carries the address of the broker that is, when known, so the caller
    /// can retry without re-hopping through a bootstrap.
    #[error("wrong broker, leader is at {broker_address:?}")]
    WrongBroker { broker_address: Option<String> },

    /// Request failed validation before reaching any component state.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn wrong_broker(broker_address: Option<String>) -> Self {
        Self::WrongBroker { broker_address }
    }

    /// The error kind as a stable lowercase tag, used in RPC error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::NoBootstrap => "no_bootstrap",
            Self::Backend(_) => "backend",
            Self::WrongBroker { .. } => "wrong_broker",
            Self::Validation(_) => "validation",
            Self::Serialization(_) => "serialization",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
