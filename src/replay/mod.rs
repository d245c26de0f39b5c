//! Replay mode: load the store and re-publish it with the original timing.

pub mod scheduler;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::broker::{BrokerError, BrokerEvent, Publisher};
use crate::store::{MessageStore, StoreError};

pub use scheduler::{ReplayScheduler, ReplaySummary};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Cannot read message store")]
    Store(#[from] StoreError),

    #[error("Replay aborted")]
    Broker(#[from] BrokerError),
}

/// Replay every message in `store` through `publisher`.
///
/// An empty store is not an error: nothing is published and a zero summary
/// is returned.
pub async fn replay_store(
    store: &MessageStore,
    publisher: &dyn Publisher,
    cancel: &CancellationToken,
) -> Result<ReplaySummary, ReplayError> {
    let records = store.load_all().await?;
    if records.is_empty() {
        tracing::info!(root = %store.root().display(), "No stored messages, nothing to replay");
        return Ok(ReplaySummary::default());
    }

    let scheduler = ReplayScheduler::new(records);
    if let (Some(first), Some(last)) = (scheduler.records().first(), scheduler.records().last()) {
        tracing::info!(
            root = %store.root().display(),
            count = scheduler.len(),
            first = %first.timestamp,
            last = %last.timestamp,
            span_ms = (last.timestamp - first.timestamp).num_milliseconds(),
            "Replaying stored messages"
        );
    }

    let summary = scheduler.run(publisher, cancel).await?;
    tracing::info!(
        published = summary.published,
        total = summary.total,
        cancelled = summary.cancelled,
        "Replay finished"
    );
    Ok(summary)
}

/// Like [`replay_store`], but stops as soon as the connection behind
/// `events` fails.
///
/// A connection error or a closed event stream ends the replay with
/// [`ReplayError::Broker`] even while the scheduler is waiting for the next
/// record to come due.
pub async fn replay_connected(
    store: &MessageStore,
    publisher: &dyn Publisher,
    mut events: mpsc::Receiver<BrokerEvent>,
    cancel: &CancellationToken,
) -> Result<ReplaySummary, ReplayError> {
    tokio::select! {
        biased;

        err = connection_lost(&mut events) => {
            tracing::warn!(error = %err, "Broker connection lost, stopping replay");
            Err(ReplayError::Broker(err))
        }
        result = replay_store(store, publisher, cancel) => result,
    }
}

async fn connection_lost(events: &mut mpsc::Receiver<BrokerEvent>) -> BrokerError {
    loop {
        match events.recv().await {
            Some(BrokerEvent::Error(err)) => return err,
            Some(BrokerEvent::Connected) | Some(BrokerEvent::Message { .. }) => {}
            None => return BrokerError::Closed,
        }
    }
}
