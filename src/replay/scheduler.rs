use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::broker::Publisher;
use crate::replay::ReplayError;
use crate::store::StoredRecord;

/// Outcome of a replay run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Records handed to the publisher
    pub published: usize,
    /// Records scheduled
    pub total: usize,
    /// Whether the run stopped early on cancellation
    pub cancelled: bool,
}

/// Re-emits stored records with their original spacing, starting now.
///
/// Record `i` is due at `start + (timestamp_i - timestamp_0)`, where `start`
/// is the moment [`run`](Self::run) begins. Each wait is measured against the
/// live clock, so a slow publish delays the records behind it only until
/// they are due, never cumulatively.
pub struct ReplayScheduler {
    records: Vec<StoredRecord>,
}

impl ReplayScheduler {
    /// Order records by timestamp. Records with equal timestamps keep their input order.
    pub fn new(mut records: Vec<StoredRecord>) -> Self {
        records.sort_by_key(|record| record.timestamp);
        Self { records }
    }

    pub fn records(&self) -> &[StoredRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Publish every record in order, one at a time.
    pub async fn run(
        &self,
        publisher: &dyn Publisher,
        cancel: &CancellationToken,
    ) -> Result<ReplaySummary, ReplayError> {
        let mut summary = ReplaySummary {
            total: self.records.len(),
            ..ReplaySummary::default()
        };
        let Some(first) = self.records.first() else {
            return Ok(summary);
        };

        let start = Instant::now();
        let origin = first.timestamp;

        for record in &self.records {
            let due = start + (record.timestamp - origin).to_std().unwrap_or_default();

            if due > Instant::now() {
                tokio::select! {
                    biased;

                    _ = cancel.cancelled() => {
                        summary.cancelled = true;
                        break;
                    }
                    _ = tokio::time::sleep_until(due) => {}
                }
            }
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            tracing::debug!(
                topic = %record.topic,
                timestamp = %record.timestamp,
                "Replaying message"
            );
            publisher
                .publish(&record.topic, record.payload.clone())
                .await?;
            summary.published += 1;
        }

        Ok(summary)
    }
}
