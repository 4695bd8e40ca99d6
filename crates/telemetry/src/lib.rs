//! Structured logging, in-process metrics, and health reporting shared by
//! the broker service and client library.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
