//! Construction rules, one per entity variant.
//!
//! Each rule is a small struct implementing [`ConstructionRule`]; the
//! [`RuleTable`] maps element tag names to rules and is the loader's only
//! dispatch mechanism. Field groups shared across variants live in
//! [`fields`].

mod config;
mod coordinate_system;
mod crs;
mod datum;
pub mod fields;
mod reference_data;
mod rule;
mod table;

pub use config::create_rule_table;
pub use coordinate_system::{CoordinateSystemAxisRule, CoordinateSystemRule};
pub use crs::{
    reference_system, CompoundCrsRule, EngineeringCrsRule, GeodeticCrsRule, ProjectedCrsRule,
    VerticalCrsRule,
};
pub use datum::{datum, DatumRule, GeodeticDatumRule};
pub use reference_data::{
    AreaOfUseRule, AxisNameRule, DictionaryEntryRule, EllipsoidRule, PrimeMeridianRule,
};
pub use rule::{ConstructionRule, Resolver};
pub use table::RuleTable;
