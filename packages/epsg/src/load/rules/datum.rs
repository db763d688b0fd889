//! Rules for datums.

use roxmltree::Node;

use super::fields;
use super::rule::{ConstructionRule, Resolver};
use crate::error::Result;
use crate::schema::{Datum, Entity, EntityKind, GeodeticDatum};

/// Fields common to every datum: entry, type, scope, area and epoch.
pub fn datum(node: Node<'_, '_>, resolver: &mut dyn Resolver) -> Result<Datum> {
    let entry = fields::dictionary_entry(node)?;
    let id = entry.identifier();

    let datum_type = fields::entry_type(node, id)?;
    let scope = fields::scope(node, id)?;
    let domain_of_validity = fields::domain_of_validity(node, id, resolver)?;
    let realization_epoch = fields::optional_date(node, id, "realizationEpoch")?;

    Ok(Datum {
        entry,
        datum_type,
        scope,
        domain_of_validity,
        realization_epoch,
    })
}

/// Rule for datums that add nothing to the common fields.
pub struct DatumRule {
    kind: EntityKind,
    wrap: fn(Datum) -> Entity,
}

impl DatumRule {
    #[must_use]
    pub fn vertical() -> Self {
        Self {
            kind: EntityKind::VerticalDatum,
            wrap: Entity::VerticalDatum,
        }
    }

    #[must_use]
    pub fn engineering() -> Self {
        Self {
            kind: EntityKind::EngineeringDatum,
            wrap: Entity::EngineeringDatum,
        }
    }
}

impl ConstructionRule for DatumRule {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn build(&self, node: Node<'_, '_>, resolver: &mut dyn Resolver) -> Result<Entity> {
        Ok((self.wrap)(datum(node, resolver)?))
    }
}

/// Rule for `<GeodeticDatum>` elements.
pub struct GeodeticDatumRule;

impl ConstructionRule for GeodeticDatumRule {
    fn kind(&self) -> EntityKind {
        EntityKind::GeodeticDatum
    }

    fn build(&self, node: Node<'_, '_>, resolver: &mut dyn Resolver) -> Result<Entity> {
        let datum = datum(node, resolver)?;
        let id = datum.entry.identifier();
        let prime_meridian = fields::reference(
            node,
            id,
            "primeMeridian",
            EntityKind::PrimeMeridian.into(),
            resolver,
        )?;
        let ellipsoid =
            fields::reference(node, id, "ellipsoid", EntityKind::Ellipsoid.into(), resolver)?;

        Ok(Entity::GeodeticDatum(GeodeticDatum {
            datum,
            prime_meridian,
            ellipsoid,
        }))
    }
}
