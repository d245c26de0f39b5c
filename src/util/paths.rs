//! Default locations used by mqtt-recorder

use std::path::PathBuf;

/// Directory captured messages go to when nothing else is configured.
/// Relative, so it resolves against the working directory.
pub const DEFAULT_MESSAGES_DIR: &str = "messages";

/// Get the mqtt-recorder data directory (~/.mqtt-recorder)
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".mqtt-recorder"))
        .unwrap_or_else(|| PathBuf::from(".mqtt-recorder"))
}

/// Get the config file path (~/.mqtt-recorder/config.toml)
pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

/// Get the default store root (./messages)
pub fn default_messages_dir() -> PathBuf {
    PathBuf::from(DEFAULT_MESSAGES_DIR)
}
