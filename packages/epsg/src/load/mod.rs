//! Loading the GML dictionary into an entity graph.
//!
//! The [`IdentifierIndex`] maps each URN to its defining element once; the
//! [`GraphLoader`] then builds entities on demand, dispatching on the
//! element's tag through a [`RuleTable`] and following references
//! depth-first.

mod index;
mod loader;
pub mod rules;

pub use index::IdentifierIndex;
pub use loader::{load_gml, EntitySet, GraphLoader};
pub use rules::{create_rule_table, ConstructionRule, Resolver, RuleTable};
