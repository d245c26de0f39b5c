//! Command-line interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::broker::{BrokerSettings, Protocol};
use crate::config::{Config, ConfigError};

#[derive(Parser)]
#[command(
    name = "mqtt-recorder",
    version,
    about = "Capture MQTT traffic to files and replay it with the original timing"
)]
pub struct Cli {
    /// Path to config.toml (default: ~/.mqtt-recorder/config.toml)
    #[arg(long, global = true, env = "MQTT_RECORDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Store root for captured messages (default: ./messages)
    #[arg(long, global = true, env = "MQTT_RECORDER_MESSAGES_DIR")]
    pub messages_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// Subscribe to every topic and save each message to the store
    Collect(BrokerArgs),
    /// Publish the stored messages again, keeping their original spacing
    Replay(BrokerArgs),
}

#[derive(Args, Clone)]
pub struct BrokerArgs {
    /// Broker host name or address
    #[arg(long, env = "MQTT_RECORDER_HOST")]
    pub host: String,

    /// Broker port
    #[arg(long, env = "MQTT_RECORDER_PORT")]
    pub port: u16,

    #[arg(long, env = "MQTT_RECORDER_USERNAME")]
    pub username: String,

    #[arg(long, env = "MQTT_RECORDER_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Transport protocol
    #[arg(long, value_enum)]
    pub protocol: Option<Protocol>,

    /// MQTT client identifier (default: collector_<random uuid>)
    #[arg(long)]
    pub client_id: Option<String>,
}

impl BrokerArgs {
    /// Combine the flags with config-file defaults; flags win.
    pub fn settings(&self, config: &Config) -> BrokerSettings {
        let mut settings = BrokerSettings::new(
            self.host.clone(),
            self.port,
            self.username.clone(),
            self.password.clone(),
        );
        settings.protocol = self.protocol.unwrap_or(config.protocol);
        settings.client_id = self.client_id.clone().or_else(|| config.client_id.clone());
        settings.keep_alive = config.keep_alive;
        settings.channel_capacity = config.channel_capacity;
        settings
    }
}

impl Cli {
    /// Load the config file and apply command-line overrides.
    pub fn resolve_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        if let Some(messages_dir) = &self.messages_dir {
            config.messages_dir = messages_dir.clone();
        }
        Ok(config)
    }
}
