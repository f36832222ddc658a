//! Note persistence: storage seam and note collection access.
//!
//! # Responsibility
//! - Define the key-value storage contract the note blob lives behind.
//! - Keep blob encoding/decoding and delete-on-empty semantics in one place.
//!
//! # Invariants
//! - The whole collection is one opaque JSON blob under one fixed key.
//! - Every lookup performs a full load; every mutation performs a full save.
//! - A stored entry always has text that trims non-empty.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod backend;
pub mod notes;

pub use backend::{FileStorage, MemoryStorage, StorageBackend};
pub use notes::{NoteCollection, NoteStore, NOTES_STORAGE_KEY};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer error for blob read/write operations.
#[derive(Debug)]
pub enum StoreError {
    /// Backend I/O failure while reading or writing a blob.
    Io(std::io::Error),
    /// Storage key is empty or would escape the storage directory.
    InvalidKey(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::InvalidKey(key) => write!(f, "invalid storage key: `{key}`"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InvalidKey(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
