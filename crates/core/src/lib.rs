//! Shared types for the partitioned pub/sub broker: records, topic metadata,
//! the error taxonomy, and the portable partition hash.

pub mod error;
pub mod hash;
pub mod record;
pub mod topic;

pub use error::{Error, Result};
pub use hash::{fnv1a, partition_for_key};
pub use record::Record;
pub use topic::TopicMetadata;
