//! Message store test fixtures
//!
//! Provides a temporary store root that is removed on drop, plus helpers
//! for writing store files directly (bypassing `MessageStore::save`) so tests
//! control exact file names.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::TempDir;

use mqtt_recorder::store::codec;
use mqtt_recorder::MessageStore;

/// A temporary message store
pub struct TestStore {
    /// TempDir handle (keeps directory alive until dropped)
    _dir: TempDir,
    /// Store root
    pub root: PathBuf,
}

impl TestStore {
    /// Create an empty store root
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path().join("messages");
        std::fs::create_dir_all(&root).expect("Failed to create store root");
        Self { _dir: dir, root }
    }

    pub fn store(&self) -> MessageStore {
        MessageStore::new(&self.root)
    }

    /// Write a message file with an explicit timestamp and suffix
    pub fn write(
        &self,
        topic: &str,
        timestamp: DateTime<Utc>,
        disambiguator: u16,
        payload: &[u8],
    ) -> PathBuf {
        let path = codec::encode_with_disambiguator(&self.root, topic, timestamp, disambiguator)
            .expect("Topic should be storable");
        write_file(&path, payload);
        path
    }

    /// Write an arbitrary file relative to the root
    pub fn write_raw(&self, relative: &str, payload: &[u8]) -> PathBuf {
        let path = self.root.join(relative);
        write_file(&path, payload);
        path
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, payload: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create topic directory");
    }
    std::fs::write(path, payload).expect("Failed to write store file");
}
