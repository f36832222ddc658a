//! Affordance element construction and style injection.
//!
//! # Responsibility
//! - Build the per-entity affordance button and its wrapper element.
//! - Inject the affordance style block into the document head exactly once.
//!
//! # Invariants
//! - Affordance elements are ephemeral; every scan pass rebuilds them from
//!   the note collection and the live tree.
//! - The hover title is the only surface showing note content outside the
//!   editor.

use crate::page::{Element, PageDocument};
use crate::store::{NoteStore, StorageBackend};
use log::info;

/// Class token on every affordance button.
pub const AFFORDANCE_CLASS: &str = "notepin-btn";
/// Class token on every affordance wrapper.
pub const WRAPPER_CLASS: &str = "notepin-wrapper";
/// Button label when a note exists for the entity.
pub const HAS_NOTE_LABEL: &str = "NOTE";
/// Button label when no note exists yet.
pub const ADD_NOTE_LABEL: &str = "+";
/// Attribute carrying the entity name for host-side click wiring.
pub const ENTITY_NAME_ATTR: &str = "data-notepin-entity";
/// Attribute telling the host to suppress the card's own click navigation
/// and event bubbling when the button is activated. Cards are links.
pub const STOP_NAV_ATTR: &str = "data-notepin-stop-nav";

const STYLE_MARKER_ATTR: &str = "data-notepin-style";

/// Fixed style block for the affordance button.
const AFFORDANCE_STYLE: &str = "\
.notepin-btn {
    background: #ff6c00 !important;
    color: white !important;
    border: none !important;
    font-size: 10px !important;
    padding: 2px 6px !important;
    margin-left: 4px !important;
    border-radius: 2px !important;
    cursor: pointer !important;
    font-weight: bold !important;
}
.notepin-btn:hover {
    background: #e85d00 !important;
}";

/// Inline style keeping the wrapper below the card content, centered, full
/// card width.
const WRAPPER_STYLE: &str =
    "margin-top: 4px !important; display: flex !important; justify-content: center !important; width: 100% !important;";

/// Builds the affordance button for `entity_name`, reading the current note
/// from the store.
pub fn create_affordance<S: StorageBackend>(store: &NoteStore<S>, entity_name: &str) -> Element {
    build_affordance(entity_name, &store.get_note(entity_name))
}

/// Builds the affordance button from an already-loaded note text.
pub fn build_affordance(entity_name: &str, note: &str) -> Element {
    let mut button = Element::new("button");
    button.add_class(AFFORDANCE_CLASS);
    button.set_attr(ENTITY_NAME_ATTR, entity_name);
    button.set_attr(STOP_NAV_ATTR, "true");
    if note.is_empty() {
        button.text = ADD_NOTE_LABEL.to_string();
        button.set_attr("title", format!("Add note for {entity_name}"));
    } else {
        button.text = HAS_NOTE_LABEL.to_string();
        button.set_attr("title", format!("Note: {note}"));
    }
    button
}

/// Wraps one affordance button in its positioning wrapper.
pub fn wrap_affordance(button: Element) -> Element {
    let mut wrapper = Element::new("div");
    wrapper.add_class(WRAPPER_CLASS);
    wrapper.set_attr("style", WRAPPER_STYLE);
    wrapper.push_child(button);
    wrapper
}

/// Returns whether `element` belongs to an affordance (button or wrapper).
pub fn is_affordance_node(element: &Element) -> bool {
    element.has_class(AFFORDANCE_CLASS) || element.has_class(WRAPPER_CLASS)
}

/// Counts affordance buttons currently present in the document body.
pub fn affordance_count(doc: &PageDocument) -> usize {
    doc.body
        .find_paths(&|el| el.has_class(AFFORDANCE_CLASS))
        .len()
}

/// Injects the affordance style block into the document head.
///
/// Idempotent: a marker attribute on the style element guards against
/// duplicate insertion. Returns whether a style element was added.
pub fn ensure_styles(doc: &mut PageDocument) -> bool {
    let already_present = doc
        .head
        .children
        .iter()
        .any(|el| el.attr(STYLE_MARKER_ATTR).is_some());
    if already_present {
        return false;
    }

    let mut style = Element::new("style");
    style.set_attr(STYLE_MARKER_ATTR, "true");
    style.text = AFFORDANCE_STYLE.to_string();
    doc.head.push_child(style);
    info!("event=styles_injected module=render status=ok");
    true
}

#[cfg(test)]
mod tests {
    use super::{
        build_affordance, ensure_styles, wrap_affordance, ADD_NOTE_LABEL, ENTITY_NAME_ATTR,
        HAS_NOTE_LABEL, WRAPPER_CLASS,
    };
    use crate::page::PageDocument;

    #[test]
    fn affordance_without_note_uses_add_label_and_prompt_title() {
        let button = build_affordance("Alice", "");
        assert_eq!(button.text, ADD_NOTE_LABEL);
        assert_eq!(button.attr("title"), Some("Add note for Alice"));
        assert_eq!(button.attr(ENTITY_NAME_ATTR), Some("Alice"));
    }

    #[test]
    fn affordance_with_note_uses_marker_label_and_note_title() {
        let button = build_affordance("Alice", "good aim");
        assert_eq!(button.text, HAS_NOTE_LABEL);
        assert_eq!(button.attr("title"), Some("Note: good aim"));
    }

    #[test]
    fn wrapper_centers_button_at_full_width() {
        let wrapper = wrap_affordance(build_affordance("Alice", ""));
        assert!(wrapper.has_class(WRAPPER_CLASS));
        let style = wrapper.attr("style").expect("wrapper has inline style");
        assert!(style.contains("justify-content: center"));
        assert!(style.contains("width: 100%"));
        assert_eq!(wrapper.children.len(), 1);
    }

    #[test]
    fn ensure_styles_injects_once() {
        let mut doc = PageDocument::new("https://host.example/");
        assert!(ensure_styles(&mut doc));
        assert!(!ensure_styles(&mut doc));
        assert_eq!(doc.head.children.len(), 1);
    }
}
