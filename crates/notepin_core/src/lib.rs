//! Core domain logic for NotePin.
//! This crate is the single source of truth for annotation invariants.

pub mod annotate;
pub mod editor;
pub mod locate;
pub mod logging;
pub mod page;
pub mod render;
pub mod scan;
pub mod store;
pub mod watch;

pub use annotate::Annotator;
pub use editor::{EditOutcome, TextInputProvider};
pub use locate::{
    EntityLocator, MarkerLocator, Selector, SelectorError, DEFAULT_ANCHOR_SELECTOR,
    DEFAULT_CARD_SELECTOR, DEFAULT_NAME_SELECTOR,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use page::{Element, NodePath, PageDocument, PageError, ReadyState};
pub use scan::{scan, ScanSummary};
pub use store::{
    FileStorage, MemoryStorage, NoteCollection, NoteStore, StorageBackend, StoreError,
    NOTES_STORAGE_KEY,
};
pub use watch::{ChangeWatcher, ScanReason, WatcherConfig};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
