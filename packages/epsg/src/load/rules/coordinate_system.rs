//! Rules for coordinate systems and their axes.

use roxmltree::Node;

use super::fields;
use super::rule::{ConstructionRule, Resolver};
use crate::error::{EpsgError, Result};
use crate::schema::{CoordinateSystem, CoordinateSystemAxis, Entity, EntityKind, EntityRef};
use crate::xml::{find_children, first_descendant_text, get_attribute};

/// Rule for `<CoordinateSystemAxis>` elements, inline or top level.
pub struct CoordinateSystemAxisRule;

impl ConstructionRule for CoordinateSystemAxisRule {
    fn kind(&self) -> EntityKind {
        EntityKind::CoordinateSystemAxis
    }

    fn build(&self, node: Node<'_, '_>, resolver: &mut dyn Resolver) -> Result<Entity> {
        let identifier = fields::identifier(node)?;
        let axis_abbrev = fields::required_text(node, &identifier, "axisAbbrev")?;
        let axis_direction = fields::required_text(node, &identifier, "axisDirection")?;
        let description_reference = fields::reference(
            node,
            &identifier,
            "descriptionReference",
            EntityKind::AxisName.into(),
            resolver,
        )?;

        Ok(Entity::CoordinateSystemAxis(CoordinateSystemAxis::new(
            identifier,
            axis_abbrev,
            axis_direction,
            description_reference,
        )))
    }
}

/// Rule shared by the four coordinate system variants, which differ only
/// in their tag.
pub struct CoordinateSystemRule {
    kind: EntityKind,
    wrap: fn(CoordinateSystem) -> Entity,
}

impl CoordinateSystemRule {
    #[must_use]
    pub fn ellipsoidal() -> Self {
        Self {
            kind: EntityKind::EllipsoidalCs,
            wrap: Entity::EllipsoidalCs,
        }
    }

    #[must_use]
    pub fn cartesian() -> Self {
        Self {
            kind: EntityKind::CartesianCs,
            wrap: Entity::CartesianCs,
        }
    }

    #[must_use]
    pub fn vertical() -> Self {
        Self {
            kind: EntityKind::VerticalCs,
            wrap: Entity::VerticalCs,
        }
    }

    #[must_use]
    pub fn spherical() -> Self {
        Self {
            kind: EntityKind::SphericalCs,
            wrap: Entity::SphericalCs,
        }
    }
}

impl ConstructionRule for CoordinateSystemRule {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn build(&self, node: Node<'_, '_>, resolver: &mut dyn Resolver) -> Result<Entity> {
        let entry = fields::dictionary_entry(node)?;
        let cs_type = fields::entry_type(node, entry.identifier())?;
        let axes = axes(node, entry.identifier(), resolver)?;

        Ok((self.wrap)(CoordinateSystem {
            entry,
            cs_type,
            axes,
        }))
    }
}

/// Axis references in document order.
///
/// An `axis` element either links to a top-level axis through `xlink:href`
/// or embeds the axis definition, in which case the embedded identifier is
/// the target.
fn axes(node: Node<'_, '_>, identifier: &str, resolver: &mut dyn Resolver) -> Result<Vec<EntityRef>> {
    find_children(node, "axis")
        .map(|axis| {
            let target = get_attribute(axis, fields::HREF)
                .map(str::to_string)
                .or_else(|| first_descendant_text(axis, "identifier"))
                .filter(|urn| !urn.is_empty())
                .ok_or_else(|| EpsgError::MalformedReference {
                    identifier: identifier.to_string(),
                    field: "axis".to_string(),
                    target: None,
                    reason: "neither a link nor an inline axis identifier".to_string(),
                })?;
            fields::resolve_target(
                identifier,
                "axis",
                &target,
                EntityKind::CoordinateSystemAxis.into(),
                resolver,
            )
        })
        .collect()
}
