use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{stream, StreamExt, TryStreamExt};
use tokio::fs;

use crate::store::codec;
use crate::store::error::StoreError;
use crate::store::record::{CapturedMessage, StoredRecord};

/// Default number of files read concurrently by [`MessageStore::load_all`].
pub const DEFAULT_READ_CONCURRENCY: usize = 64;

/// File-per-message store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct MessageStore {
    root: PathBuf,
    read_concurrency: usize,
}

impl MessageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            read_concurrency: DEFAULT_READ_CONCURRENCY,
        }
    }

    /// Limit how many stored files are read at once during [`load_all`](Self::load_all).
    pub fn with_read_concurrency(mut self, read_concurrency: usize) -> Self {
        self.read_concurrency = read_concurrency.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist one message and return the path it was written to.
    ///
    /// Intermediate topic directories are created as needed. If the generated
    /// name already exists the file is overwritten.
    pub async fn save(&self, message: &CapturedMessage) -> Result<PathBuf, StoreError> {
        let path = codec::encode(&self.root, &message.topic, message.timestamp)?;
        self.write(path, message).await
    }

    /// [`save`](Self::save) with a fixed file name suffix.
    pub(crate) async fn save_with_disambiguator(
        &self,
        message: &CapturedMessage,
        disambiguator: u16,
    ) -> Result<PathBuf, StoreError> {
        let path = codec::encode_with_disambiguator(
            &self.root,
            &message.topic,
            message.timestamp,
            disambiguator,
        )?;
        self.write(path, message).await
    }

    async fn write(&self, path: PathBuf, message: &CapturedMessage) -> Result<PathBuf, StoreError> {
        tracing::debug!(path = %path.display(), "Saving message to file");

        if let Some(dir) = path.parent() {
            tracing::debug!(dir = %dir.display(), "Creating directory");
            fs::create_dir_all(dir)
                .await
                .map_err(|source| StoreError::Write {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        fs::write(&path, &message.payload)
            .await
            .map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }

    /// Read every stored message.
    ///
    /// Records come back in no particular order. Any file whose path does not
    /// decode fails the whole call: a stray file in the store is an operator
    /// problem, not a record to skip.
    pub async fn load_all(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let files = self.list_files().await?;

        let mut located = Vec::with_capacity(files.len());
        for path in files {
            let (topic, timestamp) = codec::decode(&self.root, &path)?;
            located.push((path, topic, timestamp));
        }

        let records = stream::iter(located)
            .map(|(path, topic, timestamp)| async move {
                let payload = fs::read(&path)
                    .await
                    .map_err(|source| StoreError::Read {
                        path: path.clone(),
                        source,
                    })?;
                Ok::<_, StoreError>(StoredRecord {
                    topic,
                    timestamp,
                    payload: Bytes::from(payload),
                    path,
                })
            })
            .buffer_unordered(self.read_concurrency)
            .try_collect::<Vec<_>>()
            .await?;

        tracing::debug!(
            root = %self.root.display(),
            count = records.len(),
            "Loaded stored messages"
        );
        Ok(records)
    }

    /// Walk the store with an explicit stack of pending directories.
    async fn list_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut files = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await.map_err(|source| StoreError::Read {
                path: dir.clone(),
                source,
            })?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|source| StoreError::Read {
                    path: dir.clone(),
                    source,
                })?
            {
                let path = entry.path();
                let file_type = entry.file_type().await.map_err(|source| StoreError::Read {
                    path: path.clone(),
                    source,
                })?;

                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_symlink() {
                    let target = fs::metadata(&path).await.map_err(|source| StoreError::Read {
                        path: path.clone(),
                        source,
                    })?;
                    if target.is_dir() {
                        tracing::warn!(path = %path.display(), "Skipping symlinked directory");
                    } else {
                        files.push(path);
                    }
                } else {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }
}
