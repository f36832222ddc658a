//! Mutable element tree for page content.
//!
//! # Responsibility
//! - Model the host page subtree the annotator reads and mutates.
//! - Provide path-based addressing so callers can mutate located nodes.
//!
//! # Invariants
//! - A `NodePath` is only valid against the tree it was collected from, and
//!   only until the next structural mutation along that path.
//! - Queries walk in document order (preorder, children left to right).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Child-index path from a root element down to one of its descendants.
///
/// The empty path addresses the root itself. Kept as a type alias to make
/// semantic intent explicit in signatures.
pub type NodePath = Vec<usize>;

/// One element node: tag, attributes, direct text and child elements.
///
/// Text nodes are folded into their parent's `text` field; the annotator
/// never needs to address raw text nodes on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Lowercase tag name, e.g. `div`.
    pub tag: String,
    /// Attribute map, including `class`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    /// Direct text content of this node, before any child text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    /// Creates an empty element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Sets one attribute, replacing any previous value.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    /// Returns one attribute value if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Appends one class token to the `class` attribute.
    pub fn add_class(&mut self, class: &str) {
        match self.attrs.get_mut("class") {
            Some(existing) if !existing.is_empty() => {
                existing.push(' ');
                existing.push_str(class);
            }
            _ => {
                self.attrs.insert("class".to_string(), class.to_string());
            }
        }
    }

    /// Returns whether the `class` attribute contains the exact token.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|token| token == class)
    }

    /// Returns whether any class token starts with the given prefix.
    pub fn has_class_prefix(&self, prefix: &str) -> bool {
        self.classes().any(|token| token.starts_with(prefix))
    }

    /// Iterates class tokens in attribute order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    /// Appends a child element.
    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Concatenated text of this node and all descendants, document order.
    ///
    /// Segments are joined with single spaces, matching how display names
    /// read when a name is split over nested inline elements.
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ")
    }

    fn collect_text(&self, parts: &mut Vec<String>) {
        if !self.text.trim().is_empty() {
            parts.push(self.text.trim().to_string());
        }
        for child in &self.children {
            child.collect_text(parts);
        }
    }

    /// Returns the node addressed by `path`, or `None` for a stale path.
    pub fn node_at(&self, path: &[usize]) -> Option<&Element> {
        let mut node = self;
        for &index in path {
            node = node.children.get(index)?;
        }
        Some(node)
    }

    /// Mutable variant of [`Element::node_at`].
    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut node = self;
        for &index in path {
            node = node.children.get_mut(index)?;
        }
        Some(node)
    }

    /// Collects paths of all nodes matching `predicate`, in document order.
    ///
    /// The root itself is included (empty path) when it matches.
    pub fn find_paths(&self, predicate: &dyn Fn(&Element) -> bool) -> Vec<NodePath> {
        let mut found = Vec::new();
        self.find_paths_inner(predicate, &mut Vec::new(), &mut found);
        found
    }

    fn find_paths_inner(
        &self,
        predicate: &dyn Fn(&Element) -> bool,
        prefix: &mut NodePath,
        found: &mut Vec<NodePath>,
    ) {
        if predicate(self) {
            found.push(prefix.clone());
        }
        for (index, child) in self.children.iter().enumerate() {
            prefix.push(index);
            child.find_paths_inner(predicate, prefix, found);
            prefix.pop();
        }
    }

    /// Returns whether this node or any descendant matches `predicate`.
    pub fn subtree_matches(&self, predicate: &dyn Fn(&Element) -> bool) -> bool {
        predicate(self)
            || self
                .children
                .iter()
                .any(|child| child.subtree_matches(predicate))
    }

    /// Removes every descendant matching `predicate`, at any depth.
    ///
    /// The node itself is never removed. Returns the number of removed
    /// subtrees; descendants of a removed subtree are not counted twice.
    pub fn remove_where(&mut self, predicate: &dyn Fn(&Element) -> bool) -> usize {
        let before = self.children.len();
        self.children.retain(|child| !predicate(child));
        let mut removed = before - self.children.len();
        for child in &mut self.children {
            removed += child.remove_where(predicate);
        }
        removed
    }

    /// Inserts `element` as the next sibling of the node at `path`.
    ///
    /// Fails for the empty path (the root has no siblings) and for stale
    /// paths. Returns whether the insertion happened.
    pub fn insert_after(&mut self, path: &[usize], element: Element) -> bool {
        let Some((&last, parent_path)) = path.split_last() else {
            return false;
        };
        let Some(parent) = self.node_at_mut(parent_path) else {
            return false;
        };
        if last >= parent.children.len() {
            return false;
        }
        parent.children.insert(last + 1, element);
        true
    }
}
