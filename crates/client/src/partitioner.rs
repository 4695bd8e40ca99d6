//! Partition selection for the Producer Batcher (spec §4.E).
//!
//! `partition = stable_hash(key) mod partition_count(topic)`. The hash must
//! agree across producer processes, so this re-exports the portable FNV-1a
//! hash from `qbroker-core` rather than a process-local hasher.

pub use qbroker_core::partition_for_key;
