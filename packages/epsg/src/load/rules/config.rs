//! Rule table configuration for the EPSG GML dictionary.

use super::coordinate_system::{CoordinateSystemAxisRule, CoordinateSystemRule};
use super::crs::{CompoundCrsRule, EngineeringCrsRule, GeodeticCrsRule, ProjectedCrsRule, VerticalCrsRule};
use super::datum::{DatumRule, GeodeticDatumRule};
use super::reference_data::{
    AreaOfUseRule, AxisNameRule, DictionaryEntryRule, EllipsoidRule, PrimeMeridianRule,
};
use super::table::RuleTable;

/// Create a rule table with one rule per entity variant.
///
/// Elements of any other tag (conversions, transformations, operation
/// methods and parameters, units) have no rule and are skipped by bulk
/// loading.
#[must_use]
pub fn create_rule_table() -> RuleTable {
    let mut table = RuleTable::new();

    // Reference data
    table.register(DictionaryEntryRule);
    table.register(PrimeMeridianRule);
    table.register(EllipsoidRule);
    table.register(AreaOfUseRule);
    table.register(AxisNameRule);

    // Datums
    table.register(GeodeticDatumRule);
    table.register(DatumRule::vertical());
    table.register(DatumRule::engineering());

    // Coordinate systems
    table.register(CoordinateSystemAxisRule);
    table.register(CoordinateSystemRule::ellipsoidal());
    table.register(CoordinateSystemRule::cartesian());
    table.register(CoordinateSystemRule::vertical());
    table.register(CoordinateSystemRule::spherical());

    // Coordinate reference systems
    table.register(GeodeticCrsRule);
    table.register(ProjectedCrsRule);
    table.register(VerticalCrsRule);
    table.register(EngineeringCrsRule);
    table.register(CompoundCrsRule);

    table
}
