mod settings;

pub use settings::{Config, ConfigError, TomlBrokerConfig, TomlConfig, EXAMPLE_CONFIG};
