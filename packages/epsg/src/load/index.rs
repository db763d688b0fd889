//! URN → defining element index.

use std::collections::HashMap;

use roxmltree::{Document, Node};

use crate::xml::{get_text, has_tag};

/// Read-only mapping from every URN found in an `identifier` element to the
/// element that directly contains it.
///
/// Built in one pass over the whole document. When a URN is declared twice,
/// the later element wins; the earlier one is logged and counted.
pub struct IdentifierIndex<'a, 'input> {
    elements: HashMap<String, Node<'a, 'input>>,
    order: Vec<String>,
    duplicates: usize,
}

impl<'a, 'input> IdentifierIndex<'a, 'input> {
    /// Scan `document` for `identifier` elements.
    #[must_use]
    pub fn new(document: &'a Document<'input>) -> Self {
        let mut elements = HashMap::new();
        let mut order = Vec::new();
        let mut duplicates = 0;

        for node in document.descendants().filter(|n| has_tag(*n, "identifier")) {
            let urn = get_text(node);
            if urn.is_empty() {
                continue;
            }
            let Some(parent) = node.parent_element() else {
                continue;
            };

            if let Some(previous) = elements.insert(urn.clone(), parent) {
                duplicates += 1;
                tracing::warn!(
                    urn = %urn,
                    first = %previous.tag_name().name(),
                    second = %parent.tag_name().name(),
                    "Duplicate identifier, later element wins"
                );
            } else {
                order.push(urn);
            }
        }

        tracing::debug!(
            identifiers = order.len(),
            duplicates,
            "Built identifier index"
        );

        Self {
            elements,
            order,
            duplicates,
        }
    }

    /// All known URNs, in order of first appearance.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, urn: &str) -> bool {
        self.elements.contains_key(urn)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.order.len()
    }

    /// Number of identifier declarations that replaced an earlier one.
    #[must_use]
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Defining element for `urn`.
    #[must_use]
    pub fn get(&self, urn: &str) -> Option<Node<'a, 'input>> {
        self.elements.get(urn).copied()
    }
}
