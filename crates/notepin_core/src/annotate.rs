//! Annotator facade: one object per page lifetime.
//!
//! # Responsibility
//! - Wire store, locator, renderer, editor provider and watcher together.
//! - Expose every externally-invokable operation through one explicit
//!   interface instead of ambient globals.
//!
//! # Invariants
//! - Failure modes degrade to "this card gets no affordance"; nothing here
//!   panics or propagates an error into the host's pump loop.

use crate::editor::{edit_note, EditOutcome, TextInputProvider};
use crate::locate::EntityLocator;
use crate::page::{Element, PageDocument};
use crate::render;
use crate::scan::{scan, ScanSummary};
use crate::store::{NoteStore, StorageBackend, StoreResult};
use crate::watch::{ChangeWatcher, ScanReason, WatcherConfig};
use log::info;
use std::time::Instant;

/// Page annotator: store + locator + editor provider + watcher.
pub struct Annotator<S, L, P>
where
    S: StorageBackend,
    L: EntityLocator,
    P: TextInputProvider,
{
    store: NoteStore<S>,
    locator: L,
    provider: P,
    watcher: ChangeWatcher,
}

impl<S, L, P> Annotator<S, L, P>
where
    S: StorageBackend,
    L: EntityLocator,
    P: TextInputProvider,
{
    /// Attaches an annotator to `doc`.
    ///
    /// Injects the affordance styles and arms the watcher. The first scan
    /// runs on the first [`Annotator::pump`] call: immediately for a loaded
    /// document, on the ready signal otherwise.
    pub fn attach(
        backend: S,
        locator: L,
        provider: P,
        config: WatcherConfig,
        doc: &mut PageDocument,
        now: Instant,
    ) -> Self {
        render::ensure_styles(doc);
        let watcher = ChangeWatcher::new(config, doc, now);
        info!(
            "event=annotator_attach module=annotate status=ok location={}",
            doc.location
        );
        Self {
            store: NoteStore::new(backend),
            locator,
            provider,
            watcher,
        }
    }

    /// Evaluates watcher triggers and runs a scan pass when one is due.
    ///
    /// Call from the host loop. Returns the pass summary when a scan ran.
    pub fn pump(&mut self, doc: &mut PageDocument, now: Instant) -> Option<(ScanReason, ScanSummary)> {
        let reason = self.watcher.poll(doc, &self.locator, now)?;
        info!("event=rescan module=annotate status=ok reason={reason:?}");
        let summary = scan(doc, &self.locator, &self.store);
        Some((reason, summary))
    }

    /// Reports one observed subtree insertion to the watcher.
    pub fn record_mutation(&mut self, inserted: &Element, now: Instant) {
        self.watcher.record_mutation(&self.locator, inserted, now);
    }

    /// Runs one unconditional scan pass, outside any watcher trigger.
    pub fn scan_now(&mut self, doc: &mut PageDocument) -> ScanSummary {
        scan(doc, &self.locator, &self.store)
    }

    /// Opens the note editor for `entity_name`.
    ///
    /// Any non-cancelled outcome schedules a rescan after the configured
    /// editor delay, so the input surface can dismiss before the tree
    /// mutates.
    pub fn edit_entity(&mut self, entity_name: &str, now: Instant) -> StoreResult<EditOutcome> {
        let outcome = edit_note(&mut self.store, &mut self.provider, entity_name)?;
        if outcome.changed() {
            let delay = self.watcher.config().editor_rescan_delay;
            self.watcher.request_rescan(ScanReason::NoteEdited, delay, now);
        }
        Ok(outcome)
    }

    /// Returns the note store for direct inspection.
    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }

    /// Mutable note store access for host-side tooling.
    pub fn store_mut(&mut self) -> &mut NoteStore<S> {
        &mut self.store
    }

    /// Returns the entity locator.
    pub fn locator(&self) -> &L {
        &self.locator
    }
}
