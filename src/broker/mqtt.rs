use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS, Transport};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::broker::error::BrokerError;
use crate::broker::{BrokerEvent, Publisher};

/// Topic filter matching every topic on the broker.
const ALL_TOPICS: &str = "#";

/// How long `disconnect` waits for queued publishes to drain.
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Wire protocol used to reach the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plain TCP
    #[default]
    Mqtt,
    /// TCP with TLS
    Mqtts,
    /// WebSocket
    Ws,
    /// WebSocket with TLS
    Wss,
}

impl Protocol {
    pub fn scheme(&self) -> &'static str {
        match self {
            Protocol::Mqtt => "mqtt",
            Protocol::Mqtts => "mqtts",
            Protocol::Ws => "ws",
            Protocol::Wss => "wss",
        }
    }

    fn transport(&self) -> Transport {
        match self {
            Protocol::Mqtt => Transport::Tcp,
            Protocol::Mqtts => Transport::tls_with_default_config(),
            Protocol::Ws => Transport::Ws,
            Protocol::Wss => Transport::wss_with_default_config(),
        }
    }

    fn is_websocket(&self) -> bool {
        matches!(self, Protocol::Ws | Protocol::Wss)
    }
}

/// Whether a session should subscribe to all topics once connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeMode {
    /// Subscribe to `#` (capture)
    AllTopics,
    /// Publish only (replay)
    None,
}

/// Everything needed to open a broker connection.
#[derive(Clone)]
pub struct BrokerSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub protocol: Protocol,
    /// Client identifier; a random `collector_<uuid>` is used when unset
    pub client_id: Option<String>,
    pub keep_alive: Duration,
    /// Capacity of the request and inbound event queues
    pub channel_capacity: usize,
}

impl BrokerSettings {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
            protocol: Protocol::default(),
            client_id: None,
            keep_alive: Duration::from_secs(30),
            channel_capacity: 1024,
        }
    }

    /// URL shown in logs, e.g. `mqtt://localhost:1883`.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol.scheme(), self.host, self.port)
    }

    fn resolved_client_id(&self) -> String {
        // rumqttc rejects empty ids and ids starting with a space
        match self.client_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("collector_{}", uuid::Uuid::new_v4()),
        }
    }

    fn mqtt_options(&self, client_id: &str) -> MqttOptions {
        // Websocket transports take the full URL as the broker address.
        let address = if self.protocol.is_websocket() {
            format!("{}/mqtt", self.url())
        } else {
            self.host.clone()
        };

        let mut options = MqttOptions::new(client_id, address, self.port);
        options.set_credentials(self.username.clone(), self.password.clone());
        options.set_keep_alive(self.keep_alive.max(Duration::from_secs(1)));
        options.set_transport(self.protocol.transport());
        options
    }
}

impl std::fmt::Debug for BrokerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("protocol", &self.protocol)
            .field("client_id", &self.client_id)
            .field("keep_alive", &self.keep_alive)
            .field("channel_capacity", &self.channel_capacity)
            .finish()
    }
}

/// A live MQTT connection backed by `rumqttc`.
///
/// The event loop runs on its own task. It forwards connection
/// acknowledgements and inbound publishes as [`BrokerEvent`]s and stops at
/// the first connection error; reconnecting is left to the caller.
pub struct MqttSession {
    client: AsyncClient,
    events: Option<mpsc::Receiver<BrokerEvent>>,
    driver: JoinHandle<()>,
    client_id: String,
}

impl MqttSession {
    pub async fn connect(
        settings: &BrokerSettings,
        mode: SubscribeMode,
    ) -> Result<Self, BrokerError> {
        let client_id = settings.resolved_client_id();
        let capacity = settings.channel_capacity.max(1);
        let (client, eventloop) = AsyncClient::new(settings.mqtt_options(&client_id), capacity);

        if mode == SubscribeMode::AllTopics {
            client
                .subscribe(ALL_TOPICS, QoS::AtMostOnce)
                .await
                .map_err(|e| BrokerError::Subscribe(e.to_string()))?;
        }

        let (event_tx, event_rx) = mpsc::channel(capacity);
        let driver = tokio::spawn(drive_event_loop(
            eventloop,
            event_tx,
            settings.url(),
            settings.username.clone(),
            client_id.clone(),
        ));

        Ok(Self {
            client,
            events: Some(event_rx),
            driver,
            client_id,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Take the inbound event stream. Returns `None` after the first call.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<BrokerEvent>> {
        self.events.take()
    }

    /// Wait for the broker to acknowledge the connection.
    pub async fn wait_connected(&mut self) -> Result<(), BrokerError> {
        let events = self.events.as_mut().ok_or(BrokerError::Closed)?;
        loop {
            match events.recv().await {
                Some(BrokerEvent::Connected) => return Ok(()),
                Some(BrokerEvent::Error(err)) => return Err(err),
                Some(BrokerEvent::Message { .. }) => continue,
                None => return Err(BrokerError::Closed),
            }
        }
    }

    /// Send DISCONNECT after any queued publishes and wait for the event loop to finish.
    pub async fn disconnect(self) {
        if let Err(err) = self.client.disconnect().await {
            tracing::debug!(error = %err, "Disconnect request not queued");
        }
        match tokio::time::timeout(DISCONNECT_TIMEOUT, self.driver).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(error = %err, "MQTT event loop task failed"),
            Err(_) => tracing::warn!("Timed out waiting for MQTT event loop to stop"),
        }
    }
}

#[async_trait]
impl Publisher for MqttSession {
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<(), BrokerError> {
        self.client
            .publish_bytes(topic, QoS::AtMostOnce, false, payload)
            .await
            .map_err(|e| BrokerError::Publish {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }
}

async fn drive_event_loop(
    mut eventloop: EventLoop,
    events: mpsc::Sender<BrokerEvent>,
    url: String,
    username: String,
    client_id: String,
) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                tracing::info!(
                    url = %url,
                    username = %username,
                    client_id = %client_id,
                    "Connected to broker"
                );
                if events.send(BrokerEvent::Connected).await.is_err() {
                    break;
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let event = BrokerEvent::Message {
                    topic: publish.topic,
                    payload: publish.payload,
                };
                if events.send(event).await.is_err() {
                    break;
                }
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                tracing::debug!(url = %url, "Disconnected from broker");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::error!(url = %url, error = %err, "Connection error");
                let _ = events
                    .send(BrokerEvent::Error(BrokerError::Connection(err.to_string())))
                    .await;
                break;
            }
        }
    }
}
