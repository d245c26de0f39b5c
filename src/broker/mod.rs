//! Broker connection seam.
//!
//! Capture consumes a stream of [`BrokerEvent`]s; replay drives a
//! [`Publisher`]. [`MqttSession`] implements both on top of `rumqttc`,
//! [`MemoryBroker`] is an in-process stand-in for tests.

pub mod error;
pub mod memory;
pub mod mqtt;

use async_trait::async_trait;
use bytes::Bytes;

pub use error::BrokerError;
pub use memory::{MemoryBroker, PublishedMessage};
pub use mqtt::{BrokerSettings, MqttSession, Protocol, SubscribeMode};

/// Events delivered by a broker connection.
#[derive(Debug, Clone)]
pub enum BrokerEvent {
    /// The broker acknowledged the connection
    Connected,
    /// A message arrived on a subscribed topic
    Message { topic: String, payload: Bytes },
    /// The connection failed; no further events follow
    Error(BrokerError),
}

/// Outbound half of a broker connection.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `payload` to `topic`.
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<(), BrokerError>;
}
