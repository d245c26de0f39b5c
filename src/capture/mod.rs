//! Capture mode: drain inbound broker events into the message store.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::broker::{BrokerError, BrokerEvent};
use crate::store::{CapturedMessage, MessageStore};

/// Counts reported when capture stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSummary {
    pub saved: u64,
    pub failed: u64,
}

impl CaptureSummary {
    fn record(&mut self, outcome: Result<bool, JoinError>) {
        match outcome {
            Ok(true) => self.saved += 1,
            Ok(false) => self.failed += 1,
            Err(err) => {
                tracing::error!(error = %err, "Save task did not complete");
                self.failed += 1;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Capture aborted")]
    Broker(#[from] BrokerError),
}

pub struct CapturePipeline {
    store: Arc<MessageStore>,
}

impl CapturePipeline {
    pub fn new(store: MessageStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Save every inbound message until the stream ends, the token is
    /// cancelled, or the broker reports an error.
    ///
    /// Each message is saved on its own task. A failed save is logged and
    /// counted; it never stops the capture. Saves still in flight when the
    /// loop ends are awaited before returning.
    pub async fn run(
        &self,
        mut events: mpsc::Receiver<BrokerEvent>,
        cancel: CancellationToken,
    ) -> Result<CaptureSummary, CaptureError> {
        let mut saves = JoinSet::new();
        let mut summary = CaptureSummary::default();

        let outcome = loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::info!("Capture cancelled");
                    break Ok(());
                }
                Some(done) = saves.join_next(), if !saves.is_empty() => {
                    summary.record(done);
                }
                event = events.recv() => match event {
                    Some(BrokerEvent::Message { topic, payload }) => {
                        let message = CapturedMessage::arrived_now(topic, payload);
                        let store = self.store.clone();
                        saves.spawn(async move { persist(&store, &message).await });
                    }
                    Some(BrokerEvent::Connected) => {
                        tracing::debug!("Broker connection acknowledged");
                    }
                    Some(BrokerEvent::Error(err)) => break Err(CaptureError::Broker(err)),
                    None => {
                        tracing::info!("Inbound message stream closed");
                        break Ok(());
                    }
                }
            }
        };

        while let Some(done) = saves.join_next().await {
            summary.record(done);
        }

        tracing::info!(
            root = %self.store.root().display(),
            saved = summary.saved,
            failed = summary.failed,
            "Capture stopped"
        );

        outcome.map(|()| summary)
    }
}

async fn persist(store: &MessageStore, message: &CapturedMessage) -> bool {
    match store.save(message).await {
        Ok(_) => true,
        Err(err) => {
            tracing::error!(topic = %message.topic, error = %err, "Failed to save message");
            false
        }
    }
}
