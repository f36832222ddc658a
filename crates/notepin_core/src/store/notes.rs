//! Note collection access over a storage backend.
//!
//! # Responsibility
//! - Load, save and mutate the entity-name-to-note mapping.
//! - Enforce delete-on-empty and fail-soft decode semantics.
//!
//! # Invariants
//! - Entity names are used verbatim as keys; case/whitespace variants are
//!   distinct entities. Two page entities sharing one display name share one
//!   note entry (known limitation, preserved deliberately).
//! - Stored note text is raw caller input; only the emptiness check trims.
//! - An unreadable or unparseable blob degrades to an empty collection.

use super::{StorageBackend, StoreResult};
use log::{info, warn};
use std::collections::BTreeMap;

/// Fixed storage key the whole collection lives under.
pub const NOTES_STORAGE_KEY: &str = "notepin.notes";

/// The full entity-name-to-note mapping, one JSON object when persisted.
pub type NoteCollection = BTreeMap<String, String>;

/// Note access facade over a storage backend.
///
/// Every operation works on the full collection; there is no caching layer
/// and no partial update. Acceptable only at this system's data volume.
pub struct NoteStore<S: StorageBackend> {
    backend: S,
}

impl<S: StorageBackend> NoteStore<S> {
    /// Creates a store using the provided storage backend.
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Reads the full collection from storage.
    ///
    /// Fails soft: an absent, unreadable or malformed blob yields an empty
    /// collection. Decode failures are logged, never raised.
    pub fn load(&self) -> NoteCollection {
        let blob = match self.backend.read(NOTES_STORAGE_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return NoteCollection::new(),
            Err(err) => {
                warn!("event=notes_load module=store status=error error_code=read_failed error={err}");
                return NoteCollection::new();
            }
        };

        match serde_json::from_str::<NoteCollection>(&blob) {
            Ok(notes) => notes,
            Err(err) => {
                warn!("event=notes_load module=store status=error error_code=malformed_blob error={err}");
                NoteCollection::new()
            }
        }
    }

    /// Serializes and writes the full collection, replacing the prior blob.
    pub fn save(&mut self, notes: &NoteCollection) -> StoreResult<()> {
        let blob = serde_json::to_string(notes)
            .unwrap_or_else(|_| "{}".to_string());
        self.backend.write(NOTES_STORAGE_KEY, &blob)
    }

    /// Sets or deletes one note: load, mutate, save.
    ///
    /// # Contract
    /// - Text trimming to empty deletes the entry instead of storing it.
    /// - Non-empty text is stored raw, untrimmed.
    pub fn set_note(&mut self, entity_name: &str, text: &str) -> StoreResult<()> {
        let mut notes = self.load();
        if text.trim().is_empty() {
            notes.remove(entity_name);
            info!("event=note_set module=store status=ok action=delete entity={entity_name}");
        } else {
            notes.insert(entity_name.to_string(), text.to_string());
            info!("event=note_set module=store status=ok action=update entity={entity_name}");
        }
        self.save(&notes)
    }

    /// Returns the note for `entity_name`, or an empty string if absent.
    pub fn get_note(&self, entity_name: &str) -> String {
        self.load().get(entity_name).cloned().unwrap_or_default()
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &S {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteCollection, NoteStore, NOTES_STORAGE_KEY};
    use crate::store::backend::{MemoryStorage, StorageBackend};

    #[test]
    fn save_writes_one_json_object_under_the_fixed_key() {
        let mut store = NoteStore::new(MemoryStorage::new());
        let mut notes = NoteCollection::new();
        notes.insert("Alice".to_string(), "good aim".to_string());
        store.save(&notes).unwrap();

        let blob = store
            .backend()
            .read(NOTES_STORAGE_KEY)
            .unwrap()
            .expect("blob written");
        assert_eq!(blob, r#"{"Alice":"good aim"}"#);
    }

    #[test]
    fn load_degrades_malformed_blob_to_empty() {
        let mut storage = MemoryStorage::new();
        storage.seed(NOTES_STORAGE_KEY, "{broken");
        let store = NoteStore::new(storage);
        assert!(store.load().is_empty());
    }

    #[test]
    fn names_are_verbatim_keys_without_normalization() {
        let mut store = NoteStore::new(MemoryStorage::new());
        store.set_note("Alice", "one").unwrap();
        store.set_note("alice", "two").unwrap();
        store.set_note(" Alice", "three").unwrap();

        assert_eq!(store.get_note("Alice"), "one");
        assert_eq!(store.get_note("alice"), "two");
        assert_eq!(store.get_note(" Alice"), "three");
    }
}
