//! Rule table mapping element tag names to construction rules.

use std::collections::{HashMap, HashSet};

use roxmltree::Node;

use super::rule::ConstructionRule;
use crate::xml::get_tag_name;

/// Dispatch table from local tag name to construction rule.
///
/// Built once, before loading starts. Tags without a rule (conversions,
/// operation parameters and the like) are not errors: the loader reports
/// them as not found.
pub struct RuleTable {
    rules: HashMap<String, Box<dyn ConstructionRule>>,
}

impl RuleTable {
    /// Create a new empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Register a rule under the tag name of the kind it builds.
    pub fn register(&mut self, rule: impl ConstructionRule + 'static) {
        self.rules
            .insert(rule.kind().as_str().to_string(), Box::new(rule));
    }

    /// Register a rule under an explicit tag name, e.g. to load elements of
    /// an unsupported tag as plain dictionary entries.
    pub fn register_for(&mut self, tag_name: &str, rule: impl ConstructionRule + 'static) {
        self.rules.insert(tag_name.to_string(), Box::new(rule));
    }

    /// Get the rule for an element, if its tag has one.
    pub fn get_rule(&self, node: Node<'_, '_>) -> Option<&dyn ConstructionRule> {
        self.get(get_tag_name(node))
    }

    /// Get the rule registered for `tag_name`.
    #[must_use]
    pub fn get(&self, tag_name: &str) -> Option<&dyn ConstructionRule> {
        self.rules.get(tag_name).map(|rule| rule.as_ref())
    }

    /// Check if a rule is registered for a tag.
    #[must_use]
    pub fn has_rule(&self, tag_name: &str) -> bool {
        self.rules.contains_key(tag_name)
    }

    /// Return set of all registered tag names.
    #[must_use]
    pub fn registered_tags(&self) -> HashSet<&str> {
        self.rules.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new()
    }
}
