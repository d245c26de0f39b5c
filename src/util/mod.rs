//! Utility modules

pub mod paths;

pub use paths::{config_path, data_dir, default_messages_dir};
