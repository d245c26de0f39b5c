/// Errors reported by a broker connection.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BrokerError {
    /// The connection failed or was dropped by the broker.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The subscription request could not be queued.
    #[error("Subscribe failed: {0}")]
    Subscribe(String),

    /// A publish could not be handed to the connection.
    #[error("Publish to {topic} failed: {reason}")]
    Publish { topic: String, reason: String },

    /// The connection has already been shut down.
    #[error("Broker connection closed")]
    Closed,
}
