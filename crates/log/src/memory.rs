//! In-process, mutex-guarded `AppendLog` backend.

use async_trait::async_trait;
use parking_lot::Mutex;
use qbroker_core::{Record, Result};
use tracing::debug;

use crate::AppendLog;

struct State {
    /// Records currently retained, in offset order. `base_offset` is the
    /// offset of `records[0]`; entries before it have been evicted by
    /// retention (see `qbroker_log::retention`) and reads below it clamp up
    /// to `base_offset` rather than erroring.
    records: Vec<Record>,
    base_offset: i64,
    /// Next offset to assign, always `base_offset + records.len()`, kept
    /// separately so retention trimming never has to touch it.
    next_offset: i64,
}

/// A single mutex guards both offset assignment and the backing store, so
/// readers never observe an offset without its record or vice versa.
pub struct InMemoryLog {
    state: Mutex<State>,
}

impl Default for InMemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                records: Vec::new(),
                base_offset: 0,
                next_offset: 0,
            }),
        }
    }

    /// Drops records with `timestamp < cutoff_ms` from the front of the log,
    /// advancing `base_offset` past them. Used by the broker's retention
    /// sweep (spec §3: "persists until retention or broker shutdown").
    pub fn trim_older_than(&self, cutoff_ms: i64) -> usize {
        let mut state = self.state.lock();
        let mut evicted = 0;
        while let Some(first) = state.records.first() {
            if first.timestamp < cutoff_ms {
                state.records.remove(0);
                state.base_offset += 1;
                evicted += 1;
            } else {
                break;
            }
        }
        if evicted > 0 {
            debug!(evicted, new_base_offset = state.base_offset, "trimmed partition log");
        }
        evicted
    }
}

#[async_trait]
impl AppendLog for InMemoryLog {
    async fn append(&self, record: Record) -> Result<i64> {
        let mut state = self.state.lock();
        let offset = state.next_offset;
        state.next_offset += 1;
        state.records.push(record.with_offset(offset));
        Ok(offset)
    }

    async fn append_batch(&self, records: Vec<Record>) -> Result<Vec<i64>> {
        let mut state = self.state.lock();
        let start = state.next_offset;
        let offsets: Vec<i64> = (start..start + records.len() as i64).collect();
        state.next_offset += records.len() as i64;
        state
            .records
            .extend(records.into_iter().zip(offsets.iter()).map(|(r, &o)| r.with_offset(o)));
        Ok(offsets)
    }

    async fn read(&self, start_offset: i64, max_count: i64) -> Result<Vec<Record>> {
        if max_count <= 0 {
            return Ok(Vec::new());
        }
        let state = self.state.lock();
        let effective_start = start_offset.max(state.base_offset);
        if effective_start >= state.next_offset {
            return Ok(Vec::new());
        }
        let start_index = (effective_start - state.base_offset) as usize;
        let end_index = (start_index + max_count as usize).min(state.records.len());
        Ok(state.records[start_index..end_index].to_vec())
    }

    async fn len(&self) -> i64 {
        self.state.lock().next_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(n: u8) -> Record {
        Record::new(vec![n], vec![n], "t", 0)
    }

    #[tokio::test]
    async fn append_assigns_dense_monotonic_offsets() {
        let log = InMemoryLog::new();
        assert_eq!(log.append(rec(1)).await.unwrap(), 0);
        assert_eq!(log.append(rec(2)).await.unwrap(), 1);
        assert_eq!(log.append(rec(3)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn read_returns_prefix_in_order() {
        let log = InMemoryLog::new();
        for n in 0..5u8 {
            log.append(rec(n)).await.unwrap();
        }
        let read = log.read(1, 2).await.unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].offset, Some(1));
        assert_eq!(read[1].offset, Some(2));
    }

    #[tokio::test]
    async fn read_past_tail_truncates_without_error() {
        let log = InMemoryLog::new();
        log.append(rec(1)).await.unwrap();
        let read = log.read(0, 100).await.unwrap();
        assert_eq!(read.len(), 1);
    }

    #[tokio::test]
    async fn read_at_or_past_length_is_empty() {
        let log = InMemoryLog::new();
        log.append(rec(1)).await.unwrap();
        assert!(log.read(1, 10).await.unwrap().is_empty());
        assert!(log.read(5, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_with_zero_max_is_empty() {
        let log = InMemoryLog::new();
        log.append(rec(1)).await.unwrap();
        assert!(log.read(0, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_batch_is_contiguous_and_ordered() {
        let log = InMemoryLog::new();
        let offsets = log
            .append_batch(vec![rec(1), rec(2), rec(3)])
            .await
            .unwrap();
        assert_eq!(offsets, vec![0, 1, 2]);
        let read = log.read(0, 3).await.unwrap();
        assert_eq!(read.iter().map(|r| r.value[0]).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn trim_advances_base_offset_without_renumbering() {
        let log = InMemoryLog::new();
        for n in 0..3u8 {
            let mut r = rec(n);
            r.timestamp = n as i64;
            log.append(r).await.unwrap();
        }
        let evicted = log.trim_older_than(2);
        assert_eq!(evicted, 2);
        // offset 2 (timestamp 2) survives; offsets 0 and 1 are gone.
        let read = log.read(0, 10).await.unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].offset, Some(2));
    }
}
