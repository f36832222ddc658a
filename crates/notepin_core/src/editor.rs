//! Note editing through an injected text-input capability.
//!
//! # Responsibility
//! - Drive the prompt/update/delete flow for one entity's note.
//! - Stay agnostic of the input surface (modal, CLI stdin, scripted fake).
//!
//! # Invariants
//! - A cancelled prompt changes nothing.
//! - Submitted text is stored raw; only the emptiness check trims.

use crate::store::{NoteStore, StorageBackend, StoreResult};
use log::info;

/// Input capability the editor is polymorphic over.
///
/// `None` means the user cancelled; any returned string (including the
/// empty string) is a submission.
pub trait TextInputProvider {
    /// Asks the user for text, seeding the input surface with `initial`.
    fn prompt(&mut self, message: &str, initial: &str) -> Option<String>;
}

/// Outcome of one edit interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Prompt was dismissed; the store is untouched.
    Cancelled,
    /// Non-empty text was submitted and stored.
    Saved,
    /// Empty or whitespace-only text was submitted; the entry was deleted.
    Deleted,
}

impl EditOutcome {
    /// Returns whether this outcome mutated the store and therefore needs a
    /// follow-up rescan.
    pub fn changed(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Runs one edit interaction for `entity_name`.
///
/// Seeds the prompt with the current note and applies the submitted text
/// through [`NoteStore::set_note`] (delete-on-empty included).
pub fn edit_note<S, P>(
    store: &mut NoteStore<S>,
    provider: &mut P,
    entity_name: &str,
) -> StoreResult<EditOutcome>
where
    S: StorageBackend,
    P: TextInputProvider,
{
    let current = store.get_note(entity_name);
    let message = format!("Note for {entity_name}:");

    let Some(input) = provider.prompt(&message, &current) else {
        info!("event=note_edit module=editor status=ok outcome=cancelled entity={entity_name}");
        return Ok(EditOutcome::Cancelled);
    };

    store.set_note(entity_name, &input)?;
    let outcome = if input.trim().is_empty() {
        EditOutcome::Deleted
    } else {
        EditOutcome::Saved
    };
    info!("event=note_edit module=editor status=ok outcome={outcome:?} entity={entity_name}");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::{edit_note, EditOutcome, TextInputProvider};
    use crate::store::{MemoryStorage, NoteStore};

    struct Scripted {
        reply: Option<String>,
        seen_message: String,
        seen_initial: String,
    }

    impl TextInputProvider for Scripted {
        fn prompt(&mut self, message: &str, initial: &str) -> Option<String> {
            self.seen_message = message.to_string();
            self.seen_initial = initial.to_string();
            self.reply.clone()
        }
    }

    #[test]
    fn prompt_is_seeded_with_current_note() {
        let mut store = NoteStore::new(MemoryStorage::new());
        store.set_note("Alice", "good aim").unwrap();
        let mut provider = Scripted {
            reply: None,
            seen_message: String::new(),
            seen_initial: String::new(),
        };

        let outcome = edit_note(&mut store, &mut provider, "Alice").unwrap();
        assert_eq!(outcome, EditOutcome::Cancelled);
        assert_eq!(provider.seen_message, "Note for Alice:");
        assert_eq!(provider.seen_initial, "good aim");
        assert_eq!(store.get_note("Alice"), "good aim");
    }

    #[test]
    fn submitted_text_is_stored_raw() {
        let mut store = NoteStore::new(MemoryStorage::new());
        let mut provider = Scripted {
            reply: Some("  flanks a lot  ".to_string()),
            seen_message: String::new(),
            seen_initial: String::new(),
        };

        let outcome = edit_note(&mut store, &mut provider, "Bob").unwrap();
        assert_eq!(outcome, EditOutcome::Saved);
        assert_eq!(store.get_note("Bob"), "  flanks a lot  ");
    }

    #[test]
    fn whitespace_submission_deletes_the_entry() {
        let mut store = NoteStore::new(MemoryStorage::new());
        store.set_note("Bob", "old").unwrap();
        let mut provider = Scripted {
            reply: Some("   ".to_string()),
            seen_message: String::new(),
            seen_initial: String::new(),
        };

        let outcome = edit_note(&mut store, &mut provider, "Bob").unwrap();
        assert_eq!(outcome, EditOutcome::Deleted);
        assert_eq!(store.get_note("Bob"), "");
    }
}
