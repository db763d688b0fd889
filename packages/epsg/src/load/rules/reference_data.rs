//! Rules for reference data without outgoing references: plain dictionary
//! entries, prime meridians, ellipsoids, areas of use and axis names.

use roxmltree::Node;

use super::fields;
use super::rule::{ConstructionRule, Resolver};
use crate::error::Result;
use crate::schema::{AreaOfUse, AxisName, Bound, Ellipsoid, Entity, EntityKind, PrimeMeridian};

/// Rule for `<DictionaryEntry>` elements.
pub struct DictionaryEntryRule;

impl ConstructionRule for DictionaryEntryRule {
    fn kind(&self) -> EntityKind {
        EntityKind::DictionaryEntry
    }

    fn build(&self, node: Node<'_, '_>, _resolver: &mut dyn Resolver) -> Result<Entity> {
        Ok(Entity::DictionaryEntry(fields::dictionary_entry(node)?))
    }
}

/// Rule for `<PrimeMeridian>` elements.
pub struct PrimeMeridianRule;

impl ConstructionRule for PrimeMeridianRule {
    fn kind(&self) -> EntityKind {
        EntityKind::PrimeMeridian
    }

    fn build(&self, node: Node<'_, '_>, _resolver: &mut dyn Resolver) -> Result<Entity> {
        let entry = fields::dictionary_entry(node)?;
        let greenwich_longitude =
            fields::required_float(node, entry.identifier(), "greenwichLongitude")?;
        Ok(Entity::PrimeMeridian(PrimeMeridian {
            entry,
            greenwich_longitude,
        }))
    }
}

/// Rule for `<Ellipsoid>` elements.
///
/// The second defining parameter is either a semi-minor axis, an inverse
/// flattening or an `isSphere` flag; all three are optional.
pub struct EllipsoidRule;

impl ConstructionRule for EllipsoidRule {
    fn kind(&self) -> EntityKind {
        EntityKind::Ellipsoid
    }

    fn build(&self, node: Node<'_, '_>, _resolver: &mut dyn Resolver) -> Result<Entity> {
        let entry = fields::dictionary_entry(node)?;
        let id = entry.identifier();
        let semi_major_axis = fields::required_float(node, id, "semiMajorAxis")?;
        let semi_minor_axis = fields::optional_float(node, id, "semiMinorAxis")?;
        let inverse_flattening = fields::optional_float(node, id, "inverseFlattening")?;
        let is_sphere = fields::optional_text(node, "isSphere");

        Ok(Entity::Ellipsoid(Ellipsoid {
            entry,
            semi_major_axis,
            semi_minor_axis,
            inverse_flattening,
            is_sphere,
        }))
    }
}

/// Rule for `<AreaOfUse>` elements. Bounds come from the embedded ISO
/// geographic bounding box.
pub struct AreaOfUseRule;

impl ConstructionRule for AreaOfUseRule {
    fn kind(&self) -> EntityKind {
        EntityKind::AreaOfUse
    }

    fn build(&self, node: Node<'_, '_>, _resolver: &mut dyn Resolver) -> Result<Entity> {
        let entry = fields::dictionary_entry(node)?;
        let description = fields::optional_text(node, "description");

        let mut bounds = [0.0; 4];
        for (slot, bound) in bounds.iter_mut().zip(Bound::ALL) {
            *slot = fields::required_float(node, entry.identifier(), bound.as_str())?;
        }
        let [west, east, south, north] = bounds;

        Ok(Entity::AreaOfUse(AreaOfUse {
            entry,
            description,
            west_bound_longitude: west,
            east_bound_longitude: east,
            south_bound_latitude: south,
            north_bound_latitude: north,
        }))
    }
}

/// Rule for `<AxisName>` elements.
pub struct AxisNameRule;

impl ConstructionRule for AxisNameRule {
    fn kind(&self) -> EntityKind {
        EntityKind::AxisName
    }

    fn build(&self, node: Node<'_, '_>, _resolver: &mut dyn Resolver) -> Result<Entity> {
        let entry = fields::dictionary_entry(node)?;
        let description = fields::optional_text(node, "description");
        Ok(Entity::AxisName(AxisName { entry, description }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EpsgError;
    use crate::load::rules::fields::tests::StubResolver;
    use roxmltree::Document;

    const NS: &str = r#"xmlns:gml="http://www.opengis.net/gml/3.2" xmlns:epsg="urn:x-ogp:spec:schema-xsd:EPSG:1.0:dataset" xmlns:gmd="http://www.isotc211.org/2005/gmd" xmlns:gco="http://www.isotc211.org/2005/gco""#;

    fn build(rule: &dyn ConstructionRule, xml: &str) -> Result<Entity> {
        let doc = Document::parse(xml).unwrap();
        let mut resolver = StubResolver::new(&[]);
        rule.build(doc.root_element(), &mut resolver)
    }

    #[test]
    fn test_prime_meridian() {
        let xml = format!(
            r#"<gml:PrimeMeridian {NS}>
                <gml:identifier>urn:ogc:def:meridian:EPSG::8903</gml:identifier>
                <gml:name>Paris</gml:name>
                <gml:greenwichLongitude uom="urn:ogc:def:uom:EPSG::9105">2.5969213</gml:greenwichLongitude>
            </gml:PrimeMeridian>"#
        );
        let Entity::PrimeMeridian(pm) = build(&PrimeMeridianRule, &xml).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(pm.entry.name, "Paris");
        assert_eq!(pm.greenwich_longitude, 2.596_921_3);
    }

    #[test]
    fn test_ellipsoid_with_inverse_flattening() {
        let xml = format!(
            r#"<gml:Ellipsoid {NS}>
                <gml:identifier>urn:ogc:def:ellipsoid:EPSG::7001</gml:identifier>
                <gml:name>Airy 1830</gml:name>
                <gml:semiMajorAxis uom="urn:ogc:def:uom:EPSG::9001">6377563.396</gml:semiMajorAxis>
                <gml:secondDefiningParameter>
                    <gml:SecondDefiningParameter>
                        <gml:inverseFlattening uom="urn:ogc:def:uom:EPSG::9201">299.3249646</gml:inverseFlattening>
                    </gml:SecondDefiningParameter>
                </gml:secondDefiningParameter>
            </gml:Ellipsoid>"#
        );
        let Entity::Ellipsoid(ellipsoid) = build(&EllipsoidRule, &xml).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(ellipsoid.semi_major_axis, 6_377_563.396);
        assert_eq!(ellipsoid.inverse_flattening, Some(299.324_964_6));
        assert_eq!(ellipsoid.semi_minor_axis, None);
        assert_eq!(ellipsoid.is_sphere, None);
    }

    #[test]
    fn test_ellipsoid_malformed_axis() {
        let xml = format!(
            r#"<gml:Ellipsoid {NS}>
                <gml:identifier>urn:ogc:def:ellipsoid:EPSG::7001</gml:identifier>
                <gml:name>Airy 1830</gml:name>
                <gml:semiMajorAxis>six million</gml:semiMajorAxis>
            </gml:Ellipsoid>"#
        );
        let err = build(&EllipsoidRule, &xml).unwrap_err();
        assert!(matches!(err, EpsgError::TypeCoercion { ref field, .. } if field == "semiMajorAxis"));
    }

    #[test]
    fn test_area_of_use() {
        let xml = format!(
            r#"<epsg:AreaOfUse {NS}>
                <gml:identifier>urn:ogc:def:area:EPSG::1264</gml:identifier>
                <gml:name>UK - Great Britain; Isle of Man</gml:name>
                <epsg:extent>
                    <gmd:EX_Extent>
                        <gmd:description><gco:CharacterString>United Kingdom (UK) - Great Britain and Isle of Man.</gco:CharacterString></gmd:description>
                        <gmd:geographicElement>
                            <gmd:EX_GeographicBoundingBox>
                                <gmd:westBoundLongitude><gco:Decimal>-8.82</gco:Decimal></gmd:westBoundLongitude>
                                <gmd:eastBoundLongitude><gco:Decimal>1.92</gco:Decimal></gmd:eastBoundLongitude>
                                <gmd:southBoundLatitude><gco:Decimal>49.79</gco:Decimal></gmd:southBoundLatitude>
                                <gmd:northBoundLatitude><gco:Decimal>60.94</gco:Decimal></gmd:northBoundLatitude>
                            </gmd:EX_GeographicBoundingBox>
                        </gmd:geographicElement>
                    </gmd:EX_Extent>
                </epsg:extent>
            </epsg:AreaOfUse>"#
        );
        let Entity::AreaOfUse(area) = build(&AreaOfUseRule, &xml).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(
            area.description.as_deref(),
            Some("United Kingdom (UK) - Great Britain and Isle of Man.")
        );
        assert_eq!(area.west_bound_longitude, -8.82);
        assert_eq!(area.east_bound_longitude, 1.92);
        assert_eq!(area.south_bound_latitude, 49.79);
        assert_eq!(area.north_bound_latitude, 60.94);
    }

    #[test]
    fn test_area_of_use_missing_bound() {
        let xml = format!(
            r#"<epsg:AreaOfUse {NS}>
                <gml:identifier>urn:ogc:def:area:EPSG::1264</gml:identifier>
                <gml:name>UK</gml:name>
                <gmd:westBoundLongitude><gco:Decimal>-8.82</gco:Decimal></gmd:westBoundLongitude>
            </epsg:AreaOfUse>"#
        );
        let err = build(&AreaOfUseRule, &xml).unwrap_err();
        assert!(err.to_string().contains("eastBoundLongitude"));
    }

    #[test]
    fn test_axis_name_and_plain_entry() {
        let xml = format!(
            r#"<epsg:AxisName {NS}>
                <gml:identifier>urn:ogc:def:axis-name:EPSG::9906</gml:identifier>
                <gml:name>Easting</gml:name>
                <gml:description>East pointing axis used in 2D projected coordinate systems.</gml:description>
            </epsg:AxisName>"#
        );
        let entity = build(&AxisNameRule, &xml).unwrap();
        assert_eq!(entity.kind(), EntityKind::AxisName);
        let Entity::AxisName(name) = entity else {
            panic!("wrong variant");
        };
        assert!(name.description.unwrap().starts_with("East pointing"));

        let entity = build(&DictionaryEntryRule, &xml).unwrap();
        assert_eq!(entity.kind(), EntityKind::DictionaryEntry);
        assert_eq!(entity.name(), Some("Easting"));
    }
}
