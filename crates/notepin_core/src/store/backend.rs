//! Key-value storage backends for persisted blobs.
//!
//! # Responsibility
//! - Provide the narrow read/write contract used by [`crate::store::NoteStore`].
//! - Offer a filesystem implementation for real hosts and an in-memory one
//!   for tests and ephemeral sessions.
//!
//! # Invariants
//! - A write fully replaces any prior value under the same key.
//! - Reading an absent key is `Ok(None)`, not an error.

use super::{StoreError, StoreResult};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Narrow persistent key-value contract, the local-storage analog.
pub trait StorageBackend {
    /// Reads the blob stored under `key`, if any.
    fn read(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any prior value.
    fn write(&mut self, key: &str, value: &str) -> StoreResult<()>;
}

/// Filesystem-backed storage: one file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates a backend rooted at `dir`. The directory is created lazily on
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn blob_path(&self, key: &str) -> StoreResult<PathBuf> {
        let trimmed = key.trim();
        if trimmed.is_empty()
            || trimmed
                .chars()
                .any(|ch| ch == '/' || ch == '\\' || ch == '\0')
        {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(trimmed))
    }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.blob_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.blob_path(key)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, value)?;
        Ok(())
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds one key, bypassing the note-store write path.
    ///
    /// Used by tests to simulate pre-existing (possibly malformed) blobs.
    pub fn seed(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
