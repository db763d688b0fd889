//! Rules for coordinate reference systems.

use std::collections::BTreeSet;

use roxmltree::Node;

use super::fields;
use super::rule::{ConstructionRule, Resolver};
use crate::error::{EpsgError, Result};
use crate::schema::{
    CompoundCrs, EngineeringCrs, Entity, EntityClass, EntityKind, GeodeticCrs, ProjectedCrs,
    ReferenceSystem, VerticalCrs,
};
use crate::xml::{get_attribute, has_tag};

/// Fields common to every CRS: entry, type, scope and area.
pub fn reference_system(node: Node<'_, '_>, resolver: &mut dyn Resolver) -> Result<ReferenceSystem> {
    let entry = fields::dictionary_entry(node)?;
    let id = entry.identifier();

    let crs_type = fields::entry_type(node, id)?;
    let scope = fields::scope(node, id)?;
    let domain_of_validity = fields::domain_of_validity(node, id, resolver)?;

    Ok(ReferenceSystem {
        entry,
        crs_type,
        scope,
        domain_of_validity,
    })
}

/// Rule for `<GeodeticCRS>` elements.
pub struct GeodeticCrsRule;

impl ConstructionRule for GeodeticCrsRule {
    fn kind(&self) -> EntityKind {
        EntityKind::GeodeticCrs
    }

    fn build(&self, node: Node<'_, '_>, resolver: &mut dyn Resolver) -> Result<Entity> {
        let crs = reference_system(node, resolver)?;
        let id = crs.entry.identifier();
        let geodetic_datum = fields::reference(
            node,
            id,
            "geodeticDatum",
            EntityKind::GeodeticDatum.into(),
            resolver,
        )?;
        let ellipsoidal_cs = fields::reference(
            node,
            id,
            "ellipsoidalCS",
            EntityKind::EllipsoidalCs.into(),
            resolver,
        )?;

        Ok(Entity::GeodeticCrs(GeodeticCrs {
            crs,
            geodetic_datum,
            ellipsoidal_cs,
        }))
    }
}

/// Rule for `<ProjectedCRS>` elements. The defining conversion is skipped.
pub struct ProjectedCrsRule;

impl ConstructionRule for ProjectedCrsRule {
    fn kind(&self) -> EntityKind {
        EntityKind::ProjectedCrs
    }

    fn build(&self, node: Node<'_, '_>, resolver: &mut dyn Resolver) -> Result<Entity> {
        let crs = reference_system(node, resolver)?;
        let id = crs.entry.identifier();
        let base_geodetic_crs = fields::reference(
            node,
            id,
            "baseGeodeticCRS",
            EntityClass::CoordinateReferenceSystem,
            resolver,
        )?;
        let cartesian_cs = fields::reference(
            node,
            id,
            "cartesianCS",
            EntityKind::CartesianCs.into(),
            resolver,
        )?;

        Ok(Entity::ProjectedCrs(ProjectedCrs {
            crs,
            base_geodetic_crs,
            cartesian_cs,
        }))
    }
}

/// Rule for `<VerticalCRS>` elements.
pub struct VerticalCrsRule;

impl ConstructionRule for VerticalCrsRule {
    fn kind(&self) -> EntityKind {
        EntityKind::VerticalCrs
    }

    fn build(&self, node: Node<'_, '_>, resolver: &mut dyn Resolver) -> Result<Entity> {
        let crs = reference_system(node, resolver)?;
        let id = crs.entry.identifier();
        let vertical_datum = fields::reference(
            node,
            id,
            "verticalDatum",
            EntityKind::VerticalDatum.into(),
            resolver,
        )?;
        let vertical_cs =
            fields::reference(node, id, "verticalCS", EntityKind::VerticalCs.into(), resolver)?;

        Ok(Entity::VerticalCrs(VerticalCrs {
            crs,
            vertical_datum,
            vertical_cs,
        }))
    }
}

/// Rule for `<EngineeringCRS>` elements.
pub struct EngineeringCrsRule;

impl ConstructionRule for EngineeringCrsRule {
    fn kind(&self) -> EntityKind {
        EntityKind::EngineeringCrs
    }

    fn build(&self, node: Node<'_, '_>, resolver: &mut dyn Resolver) -> Result<Entity> {
        let crs = reference_system(node, resolver)?;
        let id = crs.entry.identifier();
        let coordinate_system = fields::reference(
            node,
            id,
            "coordinateSystem",
            EntityClass::CoordinateSystem,
            resolver,
        )?;
        let engineering_datum = fields::reference(
            node,
            id,
            "engineeringDatum",
            EntityKind::EngineeringDatum.into(),
            resolver,
        )?;

        Ok(Entity::EngineeringCrs(EngineeringCrs {
            crs,
            coordinate_system,
            engineering_datum,
        }))
    }
}

/// Rule for `<CompoundCRS>` elements.
pub struct CompoundCrsRule;

impl ConstructionRule for CompoundCrsRule {
    fn kind(&self) -> EntityKind {
        EntityKind::CompoundCrs
    }

    fn build(&self, node: Node<'_, '_>, resolver: &mut dyn Resolver) -> Result<Entity> {
        let crs = reference_system(node, resolver)?;
        let id = crs.entry.identifier();

        let mut component_reference_systems = BTreeSet::new();
        for component in node
            .descendants()
            .filter(|n| has_tag(*n, "componentReferenceSystem"))
        {
            let Some(target) = get_attribute(component, fields::HREF) else {
                return Err(EpsgError::MalformedReference {
                    identifier: id.to_string(),
                    field: "componentReferenceSystem".to_string(),
                    target: None,
                    reason: format!("no {} attribute", fields::HREF),
                });
            };
            component_reference_systems.insert(fields::resolve_target(
                id,
                "componentReferenceSystem",
                target,
                EntityClass::CoordinateReferenceSystem,
                resolver,
            )?);
        }

        Ok(Entity::CompoundCrs(CompoundCrs {
            crs,
            component_reference_systems,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::rules::fields::tests::StubResolver;
    use roxmltree::Document;

    fn crs_xml(tag: &str, body: &str) -> String {
        format!(
            r#"<gml:{tag} xmlns:gml="http://www.opengis.net/gml/3.2" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:epsg="urn:x-ogp:spec:schema-xsd:EPSG:1.0:dataset">
                <gml:metaDataProperty><epsg:CommonMetaData><epsg:type>test</epsg:type></epsg:CommonMetaData></gml:metaDataProperty>
                <gml:identifier>urn:ogc:def:crs:EPSG::1</gml:identifier>
                <gml:name>Test CRS</gml:name>
                <gml:domainOfValidity xlink:href="urn:ogc:def:area:EPSG::1262"/>
                <gml:scope>Testing.</gml:scope>
                {body}
            </gml:{tag}>"#
        )
    }

    fn resolver() -> StubResolver {
        StubResolver::new(&[
            ("urn:ogc:def:area:EPSG::1262", EntityKind::AreaOfUse),
            ("urn:ogc:def:datum:EPSG::6326", EntityKind::GeodeticDatum),
            ("urn:ogc:def:datum:EPSG::5215", EntityKind::VerticalDatum),
            ("urn:ogc:def:datum:EPSG::9300", EntityKind::EngineeringDatum),
            ("urn:ogc:def:cs:EPSG::6422", EntityKind::EllipsoidalCs),
            ("urn:ogc:def:cs:EPSG::4400", EntityKind::CartesianCs),
            ("urn:ogc:def:cs:EPSG::6499", EntityKind::VerticalCs),
            ("urn:ogc:def:crs:EPSG::4326", EntityKind::GeodeticCrs),
            ("urn:ogc:def:crs:EPSG::5621", EntityKind::VerticalCrs),
            ("urn:ogc:def:crs:EPSG::27700", EntityKind::ProjectedCrs),
        ])
    }

    fn build(rule: &dyn ConstructionRule, tag: &str, body: &str) -> Result<Entity> {
        let xml = crs_xml(tag, body);
        let doc = Document::parse(&xml).unwrap();
        rule.build(doc.root_element(), &mut resolver())
    }

    #[test]
    fn test_geodetic_crs() {
        let entity = build(
            &GeodeticCrsRule,
            "GeodeticCRS",
            r#"<gml:ellipsoidalCS xlink:href="urn:ogc:def:cs:EPSG::6422"/>
               <gml:geodeticDatum xlink:href="urn:ogc:def:datum:EPSG::6326"/>"#,
        )
        .unwrap();
        let Entity::GeodeticCrs(crs) = entity else {
            panic!("wrong variant");
        };
        assert_eq!(crs.crs.crs_type, "test");
        assert_eq!(crs.crs.scope, "Testing.");
        assert_eq!(crs.geodetic_datum.as_str(), "urn:ogc:def:datum:EPSG::6326");
        assert_eq!(crs.ellipsoidal_cs.as_str(), "urn:ogc:def:cs:EPSG::6422");
    }

    #[test]
    fn test_projected_crs_accepts_any_crs_as_base() {
        let entity = build(
            &ProjectedCrsRule,
            "ProjectedCRS",
            r#"<gml:baseGeodeticCRS xlink:href="urn:ogc:def:crs:EPSG::5621"/>
               <gml:conversion xlink:href="urn:ogc:def:coordinateOperation:EPSG::19916"/>
               <gml:cartesianCS xlink:href="urn:ogc:def:cs:EPSG::4400"/>"#,
        )
        .unwrap();
        assert_eq!(entity.kind(), EntityKind::ProjectedCrs);
    }

    #[test]
    fn test_projected_crs_rejects_datum_as_base() {
        let err = build(
            &ProjectedCrsRule,
            "ProjectedCRS",
            r#"<gml:baseGeodeticCRS xlink:href="urn:ogc:def:datum:EPSG::6326"/>
               <gml:cartesianCS xlink:href="urn:ogc:def:cs:EPSG::4400"/>"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("expected CoordinateReferenceSystem"));
    }

    #[test]
    fn test_vertical_and_engineering_crs() {
        let vertical = build(
            &VerticalCrsRule,
            "VerticalCRS",
            r#"<gml:verticalCS xlink:href="urn:ogc:def:cs:EPSG::6499"/>
               <gml:verticalDatum xlink:href="urn:ogc:def:datum:EPSG::5215"/>"#,
        )
        .unwrap();
        assert_eq!(vertical.kind(), EntityKind::VerticalCrs);

        let engineering = build(
            &EngineeringCrsRule,
            "EngineeringCRS",
            r#"<gml:coordinateSystem xlink:href="urn:ogc:def:cs:EPSG::4400"/>
               <gml:engineeringDatum xlink:href="urn:ogc:def:datum:EPSG::9300"/>"#,
        )
        .unwrap();
        let Entity::EngineeringCrs(crs) = engineering else {
            panic!("wrong variant");
        };
        assert_eq!(crs.coordinate_system.as_str(), "urn:ogc:def:cs:EPSG::4400");
    }

    #[test]
    fn test_compound_crs_components() {
        let entity = build(
            &CompoundCrsRule,
            "CompoundCRS",
            r#"<gml:componentReferenceSystem xlink:href="urn:ogc:def:crs:EPSG::5621"/>
               <gml:componentReferenceSystem xlink:href="urn:ogc:def:crs:EPSG::4326"/>"#,
        )
        .unwrap();
        let Entity::CompoundCrs(crs) = entity else {
            panic!("wrong variant");
        };
        let components: Vec<_> = crs
            .component_reference_systems
            .iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(
            components,
            vec!["urn:ogc:def:crs:EPSG::4326", "urn:ogc:def:crs:EPSG::5621"]
        );
    }

    #[test]
    fn test_compound_crs_missing_component() {
        let err = build(
            &CompoundCrsRule,
            "CompoundCRS",
            r#"<gml:componentReferenceSystem xlink:href="urn:ogc:def:crs:EPSG::9999"/>"#,
        )
        .unwrap_err();
        assert!(matches!(err, EpsgError::MalformedReference { .. }));
    }
}
