//! The EPSG entity model.
//!
//! A single-inheritance taxonomy flattened into one tagged enum, [`Entity`].
//! Shared field groups (dictionary entry, datum, coordinate system, CRS) are
//! embedded structs; [`EntityKind`] is the stored discriminator and
//! [`EntityClass`] adds the abstract bases for polymorphic queries.

mod entity;
mod kind;
mod value;

pub use entity::{
    AreaOfUse, AxisName, Bound, CompoundCrs, CoordinateSystem, CoordinateSystemAxis, Datum,
    DictionaryEntry, Ellipsoid, EngineeringCrs, Entity, EntityRef, GeodeticCrs, GeodeticDatum,
    PrimeMeridian, ProjectedCrs, Reference, ReferenceSystem, VerticalCrs,
};
pub use kind::{EntityClass, EntityKind};
pub use value::{coerce_date, coerce_float, coerce_optional_float, parse_date, parse_float, Value};
