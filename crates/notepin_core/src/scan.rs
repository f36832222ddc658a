//! Scan pass: synchronize affordances with the current document.
//!
//! # Responsibility
//! - Remove stale affordances and re-insert one per valid entity card.
//! - Report per-pass counts for watcher bookkeeping and diagnostics.
//!
//! # Invariants
//! - Cleanup runs before insertion, so repeated passes never duplicate
//!   affordances.
//! - A card failing name or anchor lookup is skipped and logged, never
//!   fatal; later passes retry it against the live tree.

use crate::locate::EntityLocator;
use crate::page::PageDocument;
use crate::render;
use crate::store::{NoteStore, StorageBackend};
use log::{debug, info};

const CARD_PREVIEW_CHARS: usize = 120;

/// Minimum trimmed display-name length. Shorter extractions are treated as
/// placeholder nodes, matching the host page's loading skeletons.
const MIN_NAME_CHARS: usize = 2;

/// Counts from one scan pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Entity cards enumerated in the document.
    pub cards_seen: usize,
    /// Affordances inserted this pass.
    pub affordances_added: usize,
    /// Cards skipped because no name node was found.
    pub skipped_missing_name: usize,
    /// Cards skipped because the trimmed name was empty or one character.
    pub skipped_short_name: usize,
    /// Cards skipped because no anchor node was found.
    pub skipped_missing_anchor: usize,
}

impl ScanSummary {
    /// Total cards skipped this pass, any reason.
    pub fn skipped(&self) -> usize {
        self.skipped_missing_name + self.skipped_short_name + self.skipped_missing_anchor
    }
}

/// Runs one full scan pass over the document.
///
/// Removes every existing affordance, enumerates entity cards, and inserts
/// one affordance wrapper after each valid card's anchor node. Duplicate
/// display names produce independent insertions sharing one note entry.
pub fn scan<S, L>(doc: &mut PageDocument, locator: &L, store: &NoteStore<S>) -> ScanSummary
where
    S: StorageBackend,
    L: EntityLocator,
{
    let removed = doc.body.remove_where(&render::is_affordance_node);
    if removed > 0 {
        debug!("event=scan_cleanup module=scan status=ok removed={removed}");
    }

    let cards = locator.card_paths(doc);
    let mut summary = ScanSummary {
        cards_seen: cards.len(),
        ..ScanSummary::default()
    };

    // Insertions mutate sibling indices after the insertion point, so the
    // collected card paths are consumed in reverse document order.
    for card in cards.iter().rev() {
        let Some(raw_name) = locator.entity_name(doc, card) else {
            summary.skipped_missing_name += 1;
            debug!(
                "event=scan_skip module=scan status=skip reason=missing_name card_preview={}",
                card_preview(doc, card)
            );
            continue;
        };

        let name = raw_name.trim();
        if name.chars().count() < MIN_NAME_CHARS {
            summary.skipped_short_name += 1;
            debug!("event=scan_skip module=scan status=skip reason=short_name name={name:?}");
            continue;
        }

        let Some(anchor) = locator.anchor_path(doc, card) else {
            summary.skipped_missing_anchor += 1;
            debug!("event=scan_skip module=scan status=skip reason=missing_anchor name={name:?}");
            continue;
        };

        let wrapper = render::wrap_affordance(render::create_affordance(store, name));
        if doc.body.insert_after(&anchor, wrapper) {
            summary.affordances_added += 1;
        } else {
            summary.skipped_missing_anchor += 1;
            debug!("event=scan_skip module=scan status=skip reason=stale_anchor name={name:?}");
        }
    }

    info!(
        "event=scan_pass module=scan status=ok cards={} added={} skipped={}",
        summary.cards_seen,
        summary.affordances_added,
        summary.skipped()
    );

    summary
}

fn card_preview(doc: &PageDocument, card: &[usize]) -> String {
    let text = doc
        .body
        .node_at(card)
        .map(|node| node.text_content())
        .unwrap_or_default();
    let mut preview: String = text.chars().take(CARD_PREVIEW_CHARS).collect();
    if text.chars().count() > CARD_PREVIEW_CHARS {
        preview.push_str("...");
    }
    format!("{preview:?}")
}
