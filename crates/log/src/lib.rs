//! The Partition Log contract (spec §4.A) and an in-process backend.
//!
//! The design is agnostic to backend: any strictly-ordered, append-only
//! store satisfies [`AppendLog`] as long as offset assignment and the
//! subsequent write are observed atomically by readers. [`InMemoryLog`] is
//! the backend shipped here; a RocksDB-backed or external-ledger-backed
//! implementation (the two drafts the original C++ source left unfinished)
//! would implement the same trait without touching the Broker Service.

use async_trait::async_trait;
use qbroker_core::{Record, Result};

/// Append/read contract for one `(topic, partition)`'s ordered record log.
#[async_trait]
pub trait AppendLog: Send + Sync {
    /// Assigns the next offset and durably enqueues `record`. Returns the
    /// assigned offset.
    async fn append(&self, record: Record) -> Result<i64>;

    /// Assigns a contiguous block of offsets to `records`, in order. Either
    /// every record is appended or none are (a partial failure must not
    /// leave the offset counter advanced).
    async fn append_batch(&self, records: Vec<Record>) -> Result<Vec<i64>>;

    /// Returns at most `max_count` records starting at `start_offset`.
    /// Returns fewer than `max_count` (possibly zero) if the log doesn't
    /// have that many records yet, never an error for running off the end.
    async fn read(&self, start_offset: i64, max_count: i64) -> Result<Vec<Record>>;

    /// Number of records ever appended (the next offset that will be
    /// assigned).
    async fn len(&self) -> i64;
}

mod memory;
pub mod retention;

pub use memory::InMemoryLog;
