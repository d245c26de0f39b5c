use std::path::PathBuf;

/// Errors raised by the path codec and the message store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A stored file's path does not follow the `<topic>/<timestamp>_<digits>.json` layout.
    #[error("Malformed store path {path}: {reason}")]
    MalformedPath { path: PathBuf, reason: String },

    /// The topic cannot be mapped onto a relative directory path.
    #[error("Topic {topic:?} cannot be stored: {reason}")]
    UnsupportedTopic { topic: String, reason: String },

    /// The store root, a directory, or a stored file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A captured message could not be persisted.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        StoreError::MalformedPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported_topic(topic: &str, reason: impl Into<String>) -> Self {
        StoreError::UnsupportedTopic {
            topic: topic.to_string(),
            reason: reason.into(),
        }
    }
}
