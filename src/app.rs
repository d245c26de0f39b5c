//! Mode dispatch: wires the broker session, the store and the pipelines.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::broker::{BrokerError, BrokerSettings, MqttSession, SubscribeMode};
use crate::capture::CapturePipeline;
use crate::cli::Command;
use crate::config::Config;
use crate::replay::replay_connected;
use crate::store::MessageStore;

pub struct App {
    config: Config,
    cancel: CancellationToken,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Token that stops the running mode when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn store(&self) -> MessageStore {
        MessageStore::new(&self.config.messages_dir)
            .with_read_concurrency(self.config.read_concurrency)
    }

    /// Run one subcommand until it finishes or Ctrl-C is pressed.
    pub async fn run(&self, command: Command) -> Result<()> {
        self.cancel_on_ctrl_c();
        match command {
            Command::Collect(args) => self.collect(args.settings(&self.config)).await,
            Command::Replay(args) => self.replay(args.settings(&self.config)).await,
        }
    }

    /// Capture every message on the broker into the store.
    pub async fn collect(&self, settings: BrokerSettings) -> Result<()> {
        let mut session = MqttSession::connect(&settings, SubscribeMode::AllTopics)
            .await
            .with_context(|| format!("Failed to connect to {}", settings.url()))?;
        let events = session.take_events().ok_or(BrokerError::Closed)?;

        tracing::info!(
            url = %settings.url(),
            client_id = %session.client_id(),
            root = %self.config.messages_dir.display(),
            "Capturing all topics"
        );

        let pipeline = CapturePipeline::new(self.store());
        let result = pipeline.run(events, self.cancel.clone()).await;
        session.disconnect().await;

        result.map(|_| ()).context("Capture failed")
    }

    /// Publish the stored messages with their original spacing.
    pub async fn replay(&self, settings: BrokerSettings) -> Result<()> {
        let mut session = MqttSession::connect(&settings, SubscribeMode::None)
            .await
            .with_context(|| format!("Failed to connect to {}", settings.url()))?;

        let connected = tokio::select! {
            connected = session.wait_connected() => Some(connected),
            _ = self.cancel.cancelled() => None,
        };
        match connected {
            Some(Ok(())) => {}
            Some(Err(err)) => {
                session.disconnect().await;
                return Err(err)
                    .with_context(|| format!("Failed to connect to {}", settings.url()));
            }
            None => {
                session.disconnect().await;
                return Ok(());
            }
        }

        let Some(events) = session.take_events() else {
            session.disconnect().await;
            return Err(BrokerError::Closed).context("Replay failed");
        };
        let result = replay_connected(&self.store(), &session, events, &self.cancel).await;
        session.disconnect().await;

        result.map(|_| ()).context("Replay failed")
    }

    fn cancel_on_ctrl_c(&self) {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Interrupt received, shutting down");
                    cancel.cancel();
                }
                Err(err) => tracing::warn!(error = %err, "Cannot listen for Ctrl-C"),
            }
        });
    }
}
