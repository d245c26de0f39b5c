use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, SubsecRound, Utc};

/// A message as it arrived from the broker, before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedMessage {
    pub topic: String,
    /// Arrival time, truncated to millisecond precision
    pub timestamp: DateTime<Utc>,
    pub payload: Bytes,
}

impl CapturedMessage {
    /// Build a message stamped with the given arrival time.
    ///
    /// Sub-millisecond precision is dropped so the timestamp survives the
    /// trip through a file name unchanged.
    pub fn new(topic: impl Into<String>, timestamp: DateTime<Utc>, payload: Bytes) -> Self {
        Self {
            topic: topic.into(),
            timestamp: timestamp.trunc_subsecs(3),
            payload,
        }
    }

    /// Build a message stamped with the current wall-clock time.
    pub fn arrived_now(topic: impl Into<String>, payload: Bytes) -> Self {
        Self::new(topic, Utc::now(), payload)
    }
}

/// A message read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub topic: String,
    pub timestamp: DateTime<Utc>,
    pub payload: Bytes,
    pub path: PathBuf,
}
