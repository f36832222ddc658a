//! Entity location over page markup.
//!
//! # Responsibility
//! - Find entity cards, their display-name nodes and their anchor nodes.
//! - Keep every structural selector for the host page's markup in one place.
//!
//! # Invariants
//! - Nothing outside this module knows the host page's markup shape.
//! - Card enumeration follows document order.
//!
//! The host page's class names carry build-specific hash suffixes
//! (`styles__Nickname-sc-3441c003-2`), so class selectors support a prefix
//! form alongside exact-token matching.

use crate::page::{Element, NodePath, PageDocument};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Attribute selector marking entity cards on the host page.
pub const DEFAULT_CARD_SELECTOR: &str = r#"[data-testid="playerCard"]"#;
/// Class-prefix selector for the display-name node within a card.
pub const DEFAULT_NAME_SELECTOR: &str = ".styles__Nickname*";
/// Class-prefix selector for the anchor node the affordance follows.
pub const DEFAULT_ANCHOR_SELECTOR: &str = ".styles__Container*";

static ATTR_SELECTOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\[([A-Za-z_][A-Za-z0-9_-]*)="([^"]*)"\]$"#).expect("valid attr selector regex")
});
static CLASS_SELECTOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\.([A-Za-z_][A-Za-z0-9_-]*)(\*)?$").expect("valid class selector regex")
});

/// One parsed structural selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `[name="value"]`: attribute equality.
    AttrEquals { name: String, value: String },
    /// `.token`: exact class token.
    Class { name: String },
    /// `.token*`: class token prefix, for hash-suffixed class names.
    ClassPrefix { prefix: String },
}

impl Selector {
    /// Parses one selector from its string form.
    ///
    /// # Errors
    /// - Empty input and any syntax outside the three supported forms.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }

        if let Some(captures) = ATTR_SELECTOR_RE.captures(trimmed) {
            return Ok(Self::AttrEquals {
                name: captures[1].to_string(),
                value: captures[2].to_string(),
            });
        }

        if let Some(captures) = CLASS_SELECTOR_RE.captures(trimmed) {
            let name = captures[1].to_string();
            return Ok(if captures.get(2).is_some() {
                Self::ClassPrefix { prefix: name }
            } else {
                Self::Class { name }
            });
        }

        Err(SelectorError::Unsupported(trimmed.to_string()))
    }

    /// Returns whether `element` matches this selector.
    pub fn matches(&self, element: &Element) -> bool {
        match self {
            Self::AttrEquals { name, value } => element.attr(name) == Some(value.as_str()),
            Self::Class { name } => element.has_class(name),
            Self::ClassPrefix { prefix } => element.has_class_prefix(prefix),
        }
    }
}

/// Selector parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    Empty,
    Unsupported(String),
}

impl Display for SelectorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "selector must not be empty"),
            Self::Unsupported(value) => write!(
                f,
                "unsupported selector `{value}`; expected `[attr=\"value\"]`, `.class` or `.class*`"
            ),
        }
    }
}

impl Error for SelectorError {}

/// Narrow capability for locating annotatable entities in a document.
///
/// The scanner is markup-agnostic; implementations own every structural
/// assumption about the host page.
pub trait EntityLocator {
    /// Paths of all entity cards in the document body, document order.
    fn card_paths(&self, doc: &PageDocument) -> Vec<NodePath>;

    /// Returns whether `element` is itself an entity card.
    fn is_card(&self, element: &Element) -> bool;

    /// Raw display-name text for the card at `card`, if the name node exists.
    fn entity_name(&self, doc: &PageDocument, card: &NodePath) -> Option<String>;

    /// Path of the card's anchor node, after which the affordance is placed.
    fn anchor_path(&self, doc: &PageDocument, card: &NodePath) -> Option<NodePath>;

    /// Returns whether `element` is, or contains, an entity card.
    fn subtree_has_card(&self, element: &Element) -> bool {
        element.subtree_matches(&|node| self.is_card(node))
    }
}

/// Selector-driven locator for the host page's current markup.
#[derive(Debug, Clone)]
pub struct MarkerLocator {
    card: Selector,
    name: Selector,
    anchor: Selector,
}

impl MarkerLocator {
    /// Creates a locator from three selector strings.
    ///
    /// # Errors
    /// - Any selector string failing [`Selector::parse`].
    pub fn new(card: &str, name: &str, anchor: &str) -> Result<Self, SelectorError> {
        Ok(Self {
            card: Selector::parse(card)?,
            name: Selector::parse(name)?,
            anchor: Selector::parse(anchor)?,
        })
    }

    /// Finds the first descendant of `card` matching `selector`, returning
    /// its absolute path. The card node itself is excluded.
    fn descendant_path(
        &self,
        doc: &PageDocument,
        card: &NodePath,
        selector: &Selector,
    ) -> Option<NodePath> {
        let card_node = doc.body.node_at(card)?;
        let relative = card_node
            .find_paths(&|el| selector.matches(el))
            .into_iter()
            .find(|path| !path.is_empty())?;
        let mut absolute = card.clone();
        absolute.extend(relative);
        Some(absolute)
    }
}

impl Default for MarkerLocator {
    fn default() -> Self {
        Self::new(
            DEFAULT_CARD_SELECTOR,
            DEFAULT_NAME_SELECTOR,
            DEFAULT_ANCHOR_SELECTOR,
        )
        .expect("valid default selectors")
    }
}

impl EntityLocator for MarkerLocator {
    fn card_paths(&self, doc: &PageDocument) -> Vec<NodePath> {
        doc.body.find_paths(&|el| self.card.matches(el))
    }

    fn is_card(&self, element: &Element) -> bool {
        self.card.matches(element)
    }

    fn entity_name(&self, doc: &PageDocument, card: &NodePath) -> Option<String> {
        let name_path = self.descendant_path(doc, card, &self.name)?;
        let name_node = doc.body.node_at(&name_path)?;
        Some(name_node.text_content())
    }

    fn anchor_path(&self, doc: &PageDocument, card: &NodePath) -> Option<NodePath> {
        self.descendant_path(doc, card, &self.anchor)
    }
}
