//! Graph loader tests against the GML fixtures.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use epsg_registry::load::rules::{create_rule_table, DictionaryEntryRule};
use epsg_registry::load::{load_gml, GraphLoader};
use epsg_registry::schema::{Entity, EntityClass, EntityKind, EntityRef, Value};
use epsg_registry::EpsgError;
use pretty_assertions::assert_eq;
use roxmltree::Document;

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

#[test]
fn test_minimal_fixture_loads_everything() {
    let xml = load_fixture("minimal.xml");
    let doc = Document::parse(&xml).unwrap();
    let mut loader = GraphLoader::new(&doc);

    assert_eq!(loader.index().count(), 2);
    assert_eq!(loader.load_all().unwrap(), 2);
    assert!(loader.contains("urn:ogc:def:area:EPSG::1262"));
    assert!(loader.contains("urn:ogc:def:meridian:EPSG::8901"));
}

#[test]
fn test_partial_fixture_skips_unrecognized_elements() {
    let xml = load_fixture("partial.xml");
    let doc = Document::parse(&xml).unwrap();
    let mut loader = GraphLoader::new(&doc);

    assert_eq!(loader.index().count(), 5);
    assert_eq!(loader.load_all().unwrap(), 2);

    let err = loader
        .resolve("urn:ogc:def:method:EPSG::9807")
        .unwrap_err();
    assert!(matches!(
        err,
        EpsgError::NotFound { tag: Some(ref tag), .. } if tag == "OperationMethod"
    ));
}

#[test]
fn test_partial_fixture_with_extended_rule_table() {
    let xml = load_fixture("partial.xml");
    let doc = Document::parse(&xml).unwrap();

    let mut rules = create_rule_table();
    rules.register_for("OperationMethod", DictionaryEntryRule);
    let mut loader = GraphLoader::with_rules(&doc, rules);

    assert_eq!(loader.load_all().unwrap(), 4);
    let method = loader.get("urn:ogc:def:method:EPSG::9603").unwrap();
    assert_eq!(method.kind(), EntityKind::DictionaryEntry);
    assert_eq!(
        method.name(),
        Some("Geocentric translations (geog2D domain)")
    );
    assert!(!loader.contains("urn:ogc:def:coordinateOperation:EPSG::1314"));
}

#[test]
fn test_full_fixture_counts() {
    let set = load_gml(&load_fixture("full.xml")).unwrap();
    assert_eq!(set.len(), 45);

    let counts = set.kind_counts();
    let count = |kind| counts.get(&kind).copied().unwrap_or_default();
    assert_eq!(count(EntityKind::AreaOfUse), 6);
    assert_eq!(count(EntityKind::PrimeMeridian), 2);
    assert_eq!(count(EntityKind::Ellipsoid), 6);
    assert_eq!(count(EntityKind::AxisName), 5);
    assert_eq!(count(EntityKind::CoordinateSystemAxis), 5);
    assert_eq!(count(EntityKind::GeodeticDatum), 5);
    assert_eq!(count(EntityKind::VerticalDatum), 1);
    assert_eq!(count(EntityKind::EngineeringDatum), 1);
    assert_eq!(count(EntityKind::EllipsoidalCs), 1);
    assert_eq!(count(EntityKind::CartesianCs), 1);
    assert_eq!(count(EntityKind::VerticalCs), 1);
    assert_eq!(count(EntityKind::SphericalCs), 1);
    assert_eq!(count(EntityKind::GeodeticCrs), 5);
    assert_eq!(count(EntityKind::ProjectedCrs), 2);
    assert_eq!(count(EntityKind::VerticalCrs), 1);
    assert_eq!(count(EntityKind::EngineeringCrs), 1);
    assert_eq!(count(EntityKind::CompoundCrs), 1);

    assert!(!set.contains("urn:ogc:def:coordinateOperation:EPSG::19916"));
}

#[test]
fn test_compound_components_are_reference_systems() {
    let set = load_gml(&load_fixture("full.xml")).unwrap();
    let compound = set.get("urn:ogc:def:crs:EPSG::7423").unwrap();

    let Entity::CompoundCrs(crs) = compound.as_ref() else {
        panic!("expected a compound CRS, got {}", compound.kind());
    };
    let components: Vec<EntityKind> = crs
        .component_reference_systems
        .iter()
        .map(|urn| set.get(urn.as_str()).unwrap().kind())
        .collect();
    assert_eq!(
        components,
        vec![EntityKind::GeodeticCrs, EntityKind::VerticalCrs]
    );
    assert!(components
        .iter()
        .all(|kind| kind.is_a(EntityClass::CoordinateReferenceSystem)));
}

#[test]
fn test_cartesian_axes_in_document_order() {
    let xml = load_fixture("full.xml");
    let doc = Document::parse(&xml).unwrap();
    let mut loader = GraphLoader::new(&doc);

    let cs = loader.resolve("urn:ogc:def:cs:EPSG::4400").unwrap();
    let axes = &cs.coordinate_system().unwrap().axes;
    assert_eq!(
        axes,
        &vec![
            EntityRef::from("urn:ogc:def:axis:EPSG::1"),
            EntityRef::from("urn:ogc:def:axis:EPSG::2"),
        ]
    );

    let Entity::CoordinateSystemAxis(east) = loader.get(axes[0].as_str()).unwrap().as_ref().clone()
    else {
        panic!("expected an axis");
    };
    assert_eq!(east.axis_abbrev, "E");
    assert_eq!(east.axis_direction, "east");
}

#[test]
fn test_resolve_is_memoized() {
    let xml = load_fixture("full.xml");
    let doc = Document::parse(&xml).unwrap();
    let mut loader = GraphLoader::new(&doc);

    let first = loader.resolve("urn:ogc:def:crs:EPSG::27700").unwrap();
    let second = loader.resolve("urn:ogc:def:crs:EPSG::27700").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // the base CRS was built on the way and is not built again
    let base = loader.get("urn:ogc:def:crs:EPSG::4277").unwrap();
    assert!(Arc::ptr_eq(
        &base,
        &loader.resolve("urn:ogc:def:crs:EPSG::4277").unwrap()
    ));
}

#[test]
fn test_shared_area_is_one_instance() {
    let xml = load_fixture("full.xml");
    let doc = Document::parse(&xml).unwrap();
    let mut loader = GraphLoader::new(&doc);

    let projected = loader.resolve("urn:ogc:def:crs:EPSG::27700").unwrap();
    let datum = loader.resolve("urn:ogc:def:datum:EPSG::6277").unwrap();

    let projected_area = projected.domain_of_validity().unwrap();
    let datum_area = datum.domain_of_validity().unwrap();
    assert_eq!(projected_area, datum_area);
    assert!(Arc::ptr_eq(
        &loader.get(projected_area.as_str()).unwrap(),
        &loader.get(datum_area.as_str()).unwrap()
    ));
}

#[test]
fn test_loaded_scalars() {
    let set = load_gml(&load_fixture("full.xml")).unwrap();

    let Entity::Ellipsoid(airy) = set.get("urn:ogc:def:ellipsoid:EPSG::7001").unwrap().as_ref()
    else {
        panic!("expected an ellipsoid");
    };
    assert_eq!(airy.semi_major_axis, 6_377_563.396);
    assert_eq!(airy.inverse_flattening, Some(299.324_964_6));
    assert_eq!(airy.semi_minor_axis, None);

    let Entity::Ellipsoid(sphere) = set.get("urn:ogc:def:ellipsoid:EPSG::7035").unwrap().as_ref()
    else {
        panic!("expected an ellipsoid");
    };
    assert_eq!(sphere.is_sphere.as_deref(), Some("sphere"));

    let Entity::AreaOfUse(uk) = set.get("urn:ogc:def:area:EPSG::1264").unwrap().as_ref() else {
        panic!("expected an area");
    };
    assert_eq!(uk.west_bound_longitude, -8.82);
    assert_eq!(uk.north_bound_latitude, 60.94);

    let datum = set.get("urn:ogc:def:datum:EPSG::6277").unwrap();
    assert_eq!(
        datum.datum().unwrap().realization_epoch,
        NaiveDate::from_ymd_opt(1936, 1, 1)
    );
    let ntf = set.get("urn:ogc:def:datum:EPSG::6807").unwrap();
    assert_eq!(ntf.datum().unwrap().realization_epoch, None);

    let paris_crs = set.get("urn:ogc:def:crs:EPSG::4807").unwrap();
    assert_eq!(
        paris_crs.entry().unwrap().remarks.as_deref(),
        Some("Longitudes are counted from the Paris meridian.")
    );
}

#[test]
fn test_dangling_datum_reference() {
    let xml = load_fixture("broken.xml");
    let doc = Document::parse(&xml).unwrap();
    let mut loader = GraphLoader::new(&doc);

    let err = loader.resolve("urn:ogc:def:crs:EPSG::4277").unwrap_err();
    match err {
        EpsgError::MalformedReference {
            identifier,
            field,
            target,
            ..
        } => {
            assert_eq!(identifier, "urn:ogc:def:crs:EPSG::4277");
            assert_eq!(field, "geodeticDatum");
            assert_eq!(target.as_deref(), Some("urn:ogc:def:datum:EPSG::6277"));
        }
        other => panic!("expected MalformedReference, got {other}"),
    }
    assert!(!loader.contains("urn:ogc:def:crs:EPSG::4277"));
    assert!(loader.is_empty());

    // siblings are unaffected
    assert!(loader.resolve("urn:ogc:def:cs:EPSG::6422").is_ok());
    assert_eq!(loader.len(), 5);

    // and a bulk load aborts
    let err = load_gml(&xml).unwrap_err();
    assert!(err.is_integrity_error());
}

#[test]
fn test_cycles_terminate() {
    let xml = load_fixture("cycle.xml");
    let doc = Document::parse(&xml).unwrap();
    let mut loader = GraphLoader::new(&doc);

    let a = loader.resolve("urn:ogc:def:crs:EPSG::900001").unwrap();
    let b = loader.get("urn:ogc:def:crs:EPSG::900002").unwrap();

    let components = |entity: &Entity| match entity {
        Entity::CompoundCrs(crs) => crs.component_reference_systems.clone(),
        other => panic!("expected a compound CRS, got {}", other.kind()),
    };
    assert!(components(&a).contains(&EntityRef::from("urn:ogc:def:crs:EPSG::900002")));
    assert!(components(&b).contains(&EntityRef::from("urn:ogc:def:crs:EPSG::900001")));

    let own = loader.resolve("urn:ogc:def:crs:EPSG::900003").unwrap();
    assert!(components(&own).contains(&EntityRef::from("urn:ogc:def:crs:EPSG::900003")));

    assert_eq!(loader.load_all().unwrap(), 4);
}

#[test]
fn test_realization_epoch_coercion() {
    let set = load_gml(&load_fixture("full.xml")).unwrap();
    let datum = set.get("urn:ogc:def:datum:EPSG::6258").unwrap().as_ref().clone();
    let expected = NaiveDate::from_ymd_opt(1936, 1, 1);

    let midnight: NaiveDateTime = expected.unwrap().and_hms_opt(0, 0, 0).unwrap();
    for value in [
        Value::from("1936-01-01"),
        Value::from(expected.unwrap()),
        Value::from(midnight),
    ] {
        let mut entity = datum.clone();
        entity.assign("realizationEpoch", value).unwrap();
        assert_eq!(entity.datum().unwrap().realization_epoch, expected);
    }

    let mut entity = datum;
    let err = entity.assign("realizationEpoch", 99_i64).unwrap_err();
    assert!(matches!(err, EpsgError::TypeCoercion { .. }));
}
