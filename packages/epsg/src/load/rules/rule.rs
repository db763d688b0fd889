//! Construction rule trait definition.

use roxmltree::Node;

use crate::error::Result;
use crate::schema::{Entity, EntityKind};

/// Callback into the graph loader for referenced URNs.
///
/// Resolving a URN builds (and memoizes) its entity if needed and returns
/// the entity's concrete kind, so rules can check the declared class of a
/// reference. A URN whose entity is still under construction further up
/// the reference chain resolves to its kind without being built again.
pub trait Resolver {
    fn resolve_kind(&mut self, urn: &str) -> Result<EntityKind>;
}

/// Trait for construction rules.
///
/// A rule turns the defining element of one entity variant into an
/// [`Entity`], extracting scalar fields itself and handing every reference
/// to the `resolver`.
pub trait ConstructionRule: Send + Sync {
    /// Kind of entity this rule builds. Its name is the element tag the
    /// rule is registered for.
    fn kind(&self) -> EntityKind;

    /// Build the entity defined by `node`.
    fn build(&self, node: Node<'_, '_>, resolver: &mut dyn Resolver) -> Result<Entity>;
}
