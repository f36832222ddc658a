use notepin_core::editor::{EditOutcome, TextInputProvider};
use notepin_core::locate::MarkerLocator;
use notepin_core::page::{Element, PageDocument};
use notepin_core::render::{ADD_NOTE_LABEL, AFFORDANCE_CLASS, HAS_NOTE_LABEL};
use notepin_core::store::MemoryStorage;
use notepin_core::watch::{ScanReason, WatcherConfig};
use notepin_core::Annotator;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Scripted input surface: replays queued prompt replies.
struct ScriptedPrompt {
    replies: VecDeque<Option<String>>,
}

impl ScriptedPrompt {
    fn replying(replies: Vec<Option<&str>>) -> Self {
        Self {
            replies: replies
                .into_iter()
                .map(|reply| reply.map(str::to_string))
                .collect(),
        }
    }
}

impl TextInputProvider for ScriptedPrompt {
    fn prompt(&mut self, _message: &str, _initial: &str) -> Option<String> {
        self.replies.pop_front().flatten()
    }
}

fn card(name: &str) -> Element {
    let mut nick = Element::new("span");
    nick.add_class("styles__Nickname-sc-3441c003-2");
    nick.text = name.to_string();
    let mut container = Element::new("div");
    container.add_class("styles__Container-sc-5688573a-0");
    container.push_child(nick);
    let mut card = Element::new("a");
    card.set_attr("data-testid", "playerCard");
    card.push_child(container);
    card
}

fn attached(
    replies: Vec<Option<&str>>,
    doc: &mut PageDocument,
    now: Instant,
) -> Annotator<MemoryStorage, MarkerLocator, ScriptedPrompt> {
    Annotator::attach(
        MemoryStorage::new(),
        MarkerLocator::default(),
        ScriptedPrompt::replying(replies),
        WatcherConfig::default(),
        doc,
        now,
    )
}

fn button_text(doc: &PageDocument) -> String {
    let paths = doc.body.find_paths(&|el| el.has_class(AFFORDANCE_CLASS));
    doc.body
        .node_at(&paths[0])
        .map(|el| el.text.clone())
        .unwrap_or_default()
}

#[test]
fn saved_edit_updates_store_and_schedules_a_rescan() {
    let mut doc = PageDocument::new("https://host.example/room/1");
    doc.body.push_child(card("Alice"));
    let now = Instant::now();
    let mut annotator = attached(vec![Some("great clutch")], &mut doc, now);

    let (reason, _) = annotator.pump(&mut doc, now).expect("startup scan runs");
    assert_eq!(reason, ScanReason::Startup);
    assert_eq!(button_text(&doc), ADD_NOTE_LABEL);

    let outcome = annotator.edit_entity("Alice", now).unwrap();
    assert_eq!(outcome, EditOutcome::Saved);
    assert_eq!(annotator.store().get_note("Alice"), "great clutch");

    // The rescan waits for the editor delay, then runs without the gate.
    assert!(annotator.pump(&mut doc, now).is_none());
    let (reason, summary) = annotator
        .pump(&mut doc, now + Duration::from_millis(100))
        .expect("edit rescan runs");
    assert_eq!(reason, ScanReason::NoteEdited);
    assert_eq!(summary.affordances_added, 1);
    assert_eq!(button_text(&doc), HAS_NOTE_LABEL);
}

#[test]
fn cancelled_edit_changes_nothing_and_schedules_no_rescan() {
    let mut doc = PageDocument::new("https://host.example/room/1");
    doc.body.push_child(card("Alice"));
    let now = Instant::now();
    let mut annotator = attached(vec![None], &mut doc, now);
    annotator.pump(&mut doc, now).expect("startup scan runs");

    let outcome = annotator.edit_entity("Alice", now).unwrap();
    assert_eq!(outcome, EditOutcome::Cancelled);
    assert_eq!(annotator.store().get_note("Alice"), "");
    assert!(annotator
        .pump(&mut doc, now + Duration::from_millis(200))
        .is_none());
}

#[test]
fn empty_edit_deletes_the_note_and_downgrades_the_affordance() {
    let mut doc = PageDocument::new("https://host.example/room/1");
    doc.body.push_child(card("Alice"));
    let now = Instant::now();
    let mut annotator = attached(vec![Some("good aim"), Some("")], &mut doc, now);
    annotator.pump(&mut doc, now).expect("startup scan runs");

    annotator.edit_entity("Alice", now).unwrap();
    annotator
        .pump(&mut doc, now + Duration::from_millis(100))
        .expect("edit rescan runs");
    assert_eq!(button_text(&doc), HAS_NOTE_LABEL);

    let later = now + Duration::from_millis(500);
    let outcome = annotator.edit_entity("Alice", later).unwrap();
    assert_eq!(outcome, EditOutcome::Deleted);
    annotator
        .pump(&mut doc, later + Duration::from_millis(100))
        .expect("delete rescan runs");
    assert_eq!(button_text(&doc), ADD_NOTE_LABEL);
    assert!(annotator.store().load().is_empty());
}

#[test]
fn editing_one_duplicate_card_updates_every_card_with_that_name() {
    let mut doc = PageDocument::new("https://host.example/room/1");
    doc.body.push_child(card("Alice"));
    doc.body.push_child(card("Alice"));
    let now = Instant::now();
    let mut annotator = attached(vec![Some("shared note")], &mut doc, now);
    annotator.pump(&mut doc, now).expect("startup scan runs");

    annotator.edit_entity("Alice", now).unwrap();
    annotator
        .pump(&mut doc, now + Duration::from_millis(100))
        .expect("edit rescan runs");

    let buttons = doc.body.find_paths(&|el| el.has_class(AFFORDANCE_CLASS));
    assert_eq!(buttons.len(), 2);
    for path in buttons {
        let button = doc.body.node_at(&path).unwrap();
        assert_eq!(button.attr("title"), Some("Note: shared note"));
    }
}
