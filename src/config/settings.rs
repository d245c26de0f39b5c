use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::broker::Protocol;
use crate::store::message_store::DEFAULT_READ_CONCURRENCY;
use crate::util::paths::{config_path, default_messages_dir};

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Store root for captured messages
    pub messages_dir: PathBuf,
    /// Capacity of the broker request and inbound event queues
    pub channel_capacity: usize,
    /// MQTT keep-alive interval
    pub keep_alive: Duration,
    /// Files read concurrently while loading the store
    pub read_concurrency: usize,
    /// Default broker protocol
    pub protocol: Protocol,
    /// Fixed client identifier, if configured
    pub client_id: Option<String>,
}

/// On-disk shape of the configuration file; every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub messages_dir: Option<PathBuf>,
    pub channel_capacity: Option<usize>,
    pub keep_alive_secs: Option<u64>,
    pub read_concurrency: Option<usize>,
    /// Broker connection defaults
    pub broker: Option<TomlBrokerConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlBrokerConfig {
    pub protocol: Option<Protocol>,
    pub client_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            messages_dir: default_messages_dir(),
            channel_capacity: 1024,
            keep_alive: Duration::from_secs(30),
            read_concurrency: DEFAULT_READ_CONCURRENCY,
            protocol: Protocol::Mqtt,
            client_id: None,
        }
    }
}

impl Config {
    /// Load the user config file (~/.mqtt-recorder/config.toml).
    ///
    /// A missing file yields the defaults; a file that exists but cannot be
    /// read or parsed is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load an explicitly named config file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let toml_config =
            toml::from_str::<TomlConfig>(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "Loaded config file");
        let mut config = Self::default();
        config.apply(toml_config);
        Ok(config)
    }

    /// Overlay the values present in `toml_config`.
    pub fn apply(&mut self, toml_config: TomlConfig) {
        if let Some(messages_dir) = toml_config.messages_dir {
            self.messages_dir = messages_dir;
        }
        if let Some(capacity) = toml_config.channel_capacity {
            self.channel_capacity = capacity.max(1);
        }
        if let Some(secs) = toml_config.keep_alive_secs {
            self.keep_alive = Duration::from_secs(secs);
        }
        if let Some(read_concurrency) = toml_config.read_concurrency {
            self.read_concurrency = read_concurrency.max(1);
        }
        if let Some(broker) = toml_config.broker {
            if let Some(protocol) = broker.protocol {
                self.protocol = protocol;
            }
            if broker.client_id.is_some() {
                self.client_id = broker.client_id;
            }
        }
    }
}
