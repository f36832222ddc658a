//! Page document model and snapshot serialization.
//!
//! # Responsibility
//! - Wrap head/body element trees with document-level metadata.
//! - Load and save JSON page snapshots for hosts and tests.
//!
//! # Invariants
//! - `ready_state` only moves from `Loading` to `Complete`, never back.
//! - Snapshot round-trips preserve the full tree byte-for-byte.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod element;

pub use element::{Element, NodePath};

pub type PageResult<T> = Result<T, PageError>;

/// Page snapshot decode/encode errors.
#[derive(Debug)]
pub enum PageError {
    Serde(serde_json::Error),
}

impl Display for PageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serde(err) => write!(f, "invalid page snapshot: {err}"),
        }
    }
}

impl Error for PageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serde(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for PageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Document load lifecycle, mirroring the host's ready signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    /// Content is still streaming in; scans must wait.
    Loading,
    /// Content is usable; scans may run.
    Complete,
}

/// One page: location, ready state and head/body element trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDocument {
    /// Current location identifier, polled for navigation changes.
    pub location: String,
    #[serde(default = "ReadyState::complete")]
    pub ready_state: ReadyState,
    #[serde(default = "PageDocument::empty_head")]
    pub head: Element,
    pub body: Element,
}

impl ReadyState {
    fn complete() -> Self {
        Self::Complete
    }
}

impl PageDocument {
    /// Creates a fully loaded document with empty head and body.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ready_state: ReadyState::Complete,
            head: Self::empty_head(),
            body: Element::new("body"),
        }
    }

    /// Creates a document that is still loading.
    pub fn loading(location: impl Into<String>) -> Self {
        Self {
            ready_state: ReadyState::Loading,
            ..Self::new(location)
        }
    }

    fn empty_head() -> Element {
        Element::new("head")
    }

    /// Marks the document as fully loaded.
    pub fn mark_complete(&mut self) {
        self.ready_state = ReadyState::Complete;
    }

    /// Decodes a document from a JSON snapshot.
    pub fn from_json(snapshot: &str) -> PageResult<Self> {
        Ok(serde_json::from_str(snapshot)?)
    }

    /// Encodes this document as a pretty-printed JSON snapshot.
    pub fn to_json(&self) -> PageResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{Element, PageDocument, ReadyState};

    #[test]
    fn snapshot_roundtrip_preserves_tree() {
        let mut doc = PageDocument::new("https://host.example/room/1");
        let mut card = Element::new("a");
        card.set_attr("data-testid", "playerCard");
        card.text = "Alice".to_string();
        doc.body.push_child(card);

        let encoded = doc.to_json().expect("snapshot encodes");
        let decoded = PageDocument::from_json(&encoded).expect("snapshot decodes");
        assert_eq!(decoded, doc);
    }

    #[test]
    fn snapshot_defaults_ready_state_and_head() {
        let decoded = PageDocument::from_json(
            r#"{"location": "https://host.example/", "body": {"tag": "body"}}"#,
        )
        .expect("minimal snapshot decodes");
        assert_eq!(decoded.ready_state, ReadyState::Complete);
        assert_eq!(decoded.head.tag, "head");
        assert!(decoded.head.children.is_empty());
    }

    #[test]
    fn from_json_rejects_malformed_snapshots() {
        assert!(PageDocument::from_json("{not json").is_err());
        assert!(PageDocument::from_json(r#"{"location": "x"}"#).is_err());
    }

    #[test]
    fn loading_documents_can_complete() {
        let mut doc = PageDocument::loading("https://host.example/");
        assert_eq!(doc.ready_state, ReadyState::Loading);
        doc.mark_complete();
        assert_eq!(doc.ready_state, ReadyState::Complete);
    }
}
