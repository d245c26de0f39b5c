//! In-process publisher for tests and dry runs
//!
//! Records every publish together with the tokio clock reading at the moment
//! it happened, so timing can be checked under a paused runtime.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::broker::error::BrokerError;
use crate::broker::Publisher;

/// A publish observed by [`MemoryBroker`].
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Bytes,
    /// When the publish call started
    pub at: Instant,
}

#[derive(Clone, Default)]
pub struct MemoryBroker {
    published: Arc<Mutex<Vec<PublishedMessage>>>,
    /// Fail every publish once this many have succeeded
    fail_after: Option<usize>,
    /// Simulated time spent inside each publish call
    publish_delay: Duration,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `count` publishes, then reject the rest.
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Make every publish call take `delay` before returning.
    pub fn with_publish_delay(mut self, delay: Duration) -> Self {
        self.publish_delay = delay;
        self
    }

    /// Snapshot of everything published so far, in publish order.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().clone()
    }
}

#[async_trait]
impl Publisher for MemoryBroker {
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<(), BrokerError> {
        let at = Instant::now();
        {
            let mut published = self.published.lock();
            if self.fail_after.is_some_and(|limit| published.len() >= limit) {
                return Err(BrokerError::Publish {
                    topic: topic.to_string(),
                    reason: "simulated failure".to_string(),
                });
            }
            published.push(PublishedMessage {
                topic: topic.to_string(),
                payload,
                at,
            });
        }

        if !self.publish_delay.is_zero() {
            tokio::time::sleep(self.publish_delay).await;
        }
        Ok(())
    }
}
