//! Entity records, one per EPSG concept.
//!
//! Object-valued fields hold an [`EntityRef`], the target's URN. The graph
//! loader guarantees that every reference it produces names an entity of
//! the declared class that lives in the same entity set, so the graph can
//! be walked through any lookup keyed by identifier (loader memo, store).

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::kind::EntityKind;
use super::value::{coerce_date, coerce_float, coerce_optional_float, Value};
use crate::error::{EpsgError, Result};

/// Reference to another entity by URN.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRef(String);

impl EntityRef {
    pub fn new(urn: impl Into<String>) -> Self {
        Self(urn.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityRef {
    fn from(urn: &str) -> Self {
        Self::new(urn)
    }
}

impl AsRef<str> for EntityRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fields shared by every named, documented entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    identifier: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_definition: Option<String>,
}

impl DictionaryEntry {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            remarks: None,
            information_source: None,
            anchor_definition: None,
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimeMeridian {
    #[serde(flatten)]
    pub entry: DictionaryEntry,
    pub greenwich_longitude: f64,
}

impl PrimeMeridian {
    pub fn set_greenwich_longitude(&mut self, value: impl Into<Value>) -> Result<()> {
        self.greenwich_longitude =
            coerce_float(&self.entry.identifier, "greenwichLongitude", value.into())?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ellipsoid {
    #[serde(flatten)]
    pub entry: DictionaryEntry,
    pub semi_major_axis: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semi_minor_axis: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_flattening: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_sphere: Option<String>,
}

impl Ellipsoid {
    pub fn set_semi_major_axis(&mut self, value: impl Into<Value>) -> Result<()> {
        self.semi_major_axis = coerce_float(&self.entry.identifier, "semiMajorAxis", value.into())?;
        Ok(())
    }

    pub fn set_semi_minor_axis(&mut self, value: impl Into<Value>) -> Result<()> {
        self.semi_minor_axis =
            coerce_optional_float(&self.entry.identifier, "semiMinorAxis", value.into())?;
        Ok(())
    }

    pub fn set_inverse_flattening(&mut self, value: impl Into<Value>) -> Result<()> {
        self.inverse_flattening =
            coerce_optional_float(&self.entry.identifier, "inverseFlattening", value.into())?;
        Ok(())
    }
}

/// One edge of an [`AreaOfUse`] bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    WestLongitude,
    EastLongitude,
    SouthLatitude,
    NorthLatitude,
}

impl Bound {
    pub const ALL: [Bound; 4] = [
        Self::WestLongitude,
        Self::EastLongitude,
        Self::SouthLatitude,
        Self::NorthLatitude,
    ];

    /// Field / element name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WestLongitude => "westBoundLongitude",
            Self::EastLongitude => "eastBoundLongitude",
            Self::SouthLatitude => "southBoundLatitude",
            Self::NorthLatitude => "northBoundLatitude",
        }
    }

    fn parse(field: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bound| bound.as_str() == field)
    }
}

/// Bounding-box validity region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaOfUse {
    #[serde(flatten)]
    pub entry: DictionaryEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub west_bound_longitude: f64,
    pub east_bound_longitude: f64,
    pub south_bound_latitude: f64,
    pub north_bound_latitude: f64,
}

impl AreaOfUse {
    #[must_use]
    pub fn bound(&self, bound: Bound) -> f64 {
        match bound {
            Bound::WestLongitude => self.west_bound_longitude,
            Bound::EastLongitude => self.east_bound_longitude,
            Bound::SouthLatitude => self.south_bound_latitude,
            Bound::NorthLatitude => self.north_bound_latitude,
        }
    }

    pub fn set_bound(&mut self, bound: Bound, value: impl Into<Value>) -> Result<()> {
        let value = coerce_float(&self.entry.identifier, bound.as_str(), value.into())?;
        let slot = match bound {
            Bound::WestLongitude => &mut self.west_bound_longitude,
            Bound::EastLongitude => &mut self.east_bound_longitude,
            Bound::SouthLatitude => &mut self.south_bound_latitude,
            Bound::NorthLatitude => &mut self.north_bound_latitude,
        };
        *slot = value;
        Ok(())
    }
}

/// Fields common to all datums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datum {
    #[serde(flatten)]
    pub entry: DictionaryEntry,
    #[serde(rename = "type")]
    pub datum_type: String,
    pub scope: String,
    pub domain_of_validity: EntityRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realization_epoch: Option<NaiveDate>,
}

impl Datum {
    /// Assign the realization epoch from a date, a datetime, a
    /// `YYYY-MM-DD` string or null.
    pub fn set_realization_epoch(&mut self, value: impl Into<Value>) -> Result<()> {
        self.realization_epoch =
            coerce_date(&self.entry.identifier, "realizationEpoch", value.into())?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeodeticDatum {
    #[serde(flatten)]
    pub datum: Datum,
    pub prime_meridian: EntityRef,
    pub ellipsoid: EntityRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisName {
    #[serde(flatten)]
    pub entry: DictionaryEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A coordinate system axis. Identified directly; not a dictionary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateSystemAxis {
    identifier: String,
    pub axis_abbrev: String,
    pub axis_direction: String,
    pub description_reference: EntityRef,
}

impl CoordinateSystemAxis {
    pub fn new(
        identifier: impl Into<String>,
        axis_abbrev: impl Into<String>,
        axis_direction: impl Into<String>,
        description_reference: EntityRef,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            axis_abbrev: axis_abbrev.into(),
            axis_direction: axis_direction.into(),
            description_reference,
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Fields common to all coordinate systems. Axis order is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateSystem {
    #[serde(flatten)]
    pub entry: DictionaryEntry,
    #[serde(rename = "type")]
    pub cs_type: String,
    pub axes: Vec<EntityRef>,
}

/// Fields common to all coordinate reference systems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceSystem {
    #[serde(flatten)]
    pub entry: DictionaryEntry,
    #[serde(rename = "type")]
    pub crs_type: String,
    pub scope: String,
    pub domain_of_validity: EntityRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeodeticCrs {
    #[serde(flatten)]
    pub crs: ReferenceSystem,
    pub geodetic_datum: EntityRef,
    #[serde(rename = "ellipsoidalCS")]
    pub ellipsoidal_cs: EntityRef,
}

/// Conversion parameters are not modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedCrs {
    #[serde(flatten)]
    pub crs: ReferenceSystem,
    #[serde(rename = "baseGeodeticCRS")]
    pub base_geodetic_crs: EntityRef,
    #[serde(rename = "cartesianCS")]
    pub cartesian_cs: EntityRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerticalCrs {
    #[serde(flatten)]
    pub crs: ReferenceSystem,
    pub vertical_datum: EntityRef,
    #[serde(rename = "verticalCS")]
    pub vertical_cs: EntityRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineeringCrs {
    #[serde(flatten)]
    pub crs: ReferenceSystem,
    pub coordinate_system: EntityRef,
    pub engineering_datum: EntityRef,
}

/// Component order carries no meaning, hence a set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundCrs {
    #[serde(flatten)]
    pub crs: ReferenceSystem,
    pub component_reference_systems: BTreeSet<EntityRef>,
}

/// An outgoing reference from an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    /// Field name, e.g. `geodeticDatum`.
    pub field: &'static str,
    /// Position within list-valued fields, 0 otherwise.
    pub position: usize,
    pub target: &'a EntityRef,
}

impl<'a> Reference<'a> {
    fn single(field: &'static str, target: &'a EntityRef) -> Self {
        Self {
            field,
            position: 0,
            target,
        }
    }
}

/// Any EPSG entity, discriminated by `class`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum Entity {
    DictionaryEntry(DictionaryEntry),
    PrimeMeridian(PrimeMeridian),
    Ellipsoid(Ellipsoid),
    AreaOfUse(AreaOfUse),
    GeodeticDatum(GeodeticDatum),
    VerticalDatum(Datum),
    EngineeringDatum(Datum),
    AxisName(AxisName),
    CoordinateSystemAxis(CoordinateSystemAxis),
    #[serde(rename = "EllipsoidalCS")]
    EllipsoidalCs(CoordinateSystem),
    #[serde(rename = "CartesianCS")]
    CartesianCs(CoordinateSystem),
    #[serde(rename = "VerticalCS")]
    VerticalCs(CoordinateSystem),
    #[serde(rename = "SphericalCS")]
    SphericalCs(CoordinateSystem),
    #[serde(rename = "GeodeticCRS")]
    GeodeticCrs(GeodeticCrs),
    #[serde(rename = "ProjectedCRS")]
    ProjectedCrs(ProjectedCrs),
    #[serde(rename = "VerticalCRS")]
    VerticalCrs(VerticalCrs),
    #[serde(rename = "EngineeringCRS")]
    EngineeringCrs(EngineeringCrs),
    #[serde(rename = "CompoundCRS")]
    CompoundCrs(CompoundCrs),
}

impl Entity {
    /// Concrete variant discriminator.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::DictionaryEntry(_) => EntityKind::DictionaryEntry,
            Self::PrimeMeridian(_) => EntityKind::PrimeMeridian,
            Self::Ellipsoid(_) => EntityKind::Ellipsoid,
            Self::AreaOfUse(_) => EntityKind::AreaOfUse,
            Self::GeodeticDatum(_) => EntityKind::GeodeticDatum,
            Self::VerticalDatum(_) => EntityKind::VerticalDatum,
            Self::EngineeringDatum(_) => EntityKind::EngineeringDatum,
            Self::AxisName(_) => EntityKind::AxisName,
            Self::CoordinateSystemAxis(_) => EntityKind::CoordinateSystemAxis,
            Self::EllipsoidalCs(_) => EntityKind::EllipsoidalCs,
            Self::CartesianCs(_) => EntityKind::CartesianCs,
            Self::VerticalCs(_) => EntityKind::VerticalCs,
            Self::SphericalCs(_) => EntityKind::SphericalCs,
            Self::GeodeticCrs(_) => EntityKind::GeodeticCrs,
            Self::ProjectedCrs(_) => EntityKind::ProjectedCrs,
            Self::VerticalCrs(_) => EntityKind::VerticalCrs,
            Self::EngineeringCrs(_) => EntityKind::EngineeringCrs,
            Self::CompoundCrs(_) => EntityKind::CompoundCrs,
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::CoordinateSystemAxis(axis) => axis.identifier(),
            other => other
                .entry()
                .map(DictionaryEntry::identifier)
                .unwrap_or_default(),
        }
    }

    /// Dictionary entry fields; `None` only for axes.
    #[must_use]
    pub fn entry(&self) -> Option<&DictionaryEntry> {
        Some(match self {
            Self::DictionaryEntry(entry) => entry,
            Self::PrimeMeridian(pm) => &pm.entry,
            Self::Ellipsoid(ellipsoid) => &ellipsoid.entry,
            Self::AreaOfUse(area) => &area.entry,
            Self::GeodeticDatum(datum) => &datum.datum.entry,
            Self::VerticalDatum(datum) | Self::EngineeringDatum(datum) => &datum.entry,
            Self::AxisName(name) => &name.entry,
            Self::CoordinateSystemAxis(_) => return None,
            Self::EllipsoidalCs(cs)
            | Self::CartesianCs(cs)
            | Self::VerticalCs(cs)
            | Self::SphericalCs(cs) => &cs.entry,
            other => &other.reference_system()?.entry,
        })
    }

    pub fn entry_mut(&mut self) -> Option<&mut DictionaryEntry> {
        Some(match self {
            Self::DictionaryEntry(entry) => entry,
            Self::PrimeMeridian(pm) => &mut pm.entry,
            Self::Ellipsoid(ellipsoid) => &mut ellipsoid.entry,
            Self::AreaOfUse(area) => &mut area.entry,
            Self::GeodeticDatum(datum) => &mut datum.datum.entry,
            Self::VerticalDatum(datum) | Self::EngineeringDatum(datum) => &mut datum.entry,
            Self::AxisName(name) => &mut name.entry,
            Self::CoordinateSystemAxis(_) => return None,
            Self::EllipsoidalCs(cs)
            | Self::CartesianCs(cs)
            | Self::VerticalCs(cs)
            | Self::SphericalCs(cs) => &mut cs.entry,
            Self::GeodeticCrs(crs) => &mut crs.crs.entry,
            Self::ProjectedCrs(crs) => &mut crs.crs.entry,
            Self::VerticalCrs(crs) => &mut crs.crs.entry,
            Self::EngineeringCrs(crs) => &mut crs.crs.entry,
            Self::CompoundCrs(crs) => &mut crs.crs.entry,
        })
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.entry().map(|entry| entry.name.as_str())
    }

    #[must_use]
    pub fn datum(&self) -> Option<&Datum> {
        match self {
            Self::GeodeticDatum(geodetic) => Some(&geodetic.datum),
            Self::VerticalDatum(datum) | Self::EngineeringDatum(datum) => Some(datum),
            _ => None,
        }
    }

    fn datum_mut(&mut self) -> Option<&mut Datum> {
        match self {
            Self::GeodeticDatum(geodetic) => Some(&mut geodetic.datum),
            Self::VerticalDatum(datum) | Self::EngineeringDatum(datum) => Some(datum),
            _ => None,
        }
    }

    #[must_use]
    pub fn coordinate_system(&self) -> Option<&CoordinateSystem> {
        match self {
            Self::EllipsoidalCs(cs)
            | Self::CartesianCs(cs)
            | Self::VerticalCs(cs)
            | Self::SphericalCs(cs) => Some(cs),
            _ => None,
        }
    }

    #[must_use]
    pub fn reference_system(&self) -> Option<&ReferenceSystem> {
        match self {
            Self::GeodeticCrs(crs) => Some(&crs.crs),
            Self::ProjectedCrs(crs) => Some(&crs.crs),
            Self::VerticalCrs(crs) => Some(&crs.crs),
            Self::EngineeringCrs(crs) => Some(&crs.crs),
            Self::CompoundCrs(crs) => Some(&crs.crs),
            _ => None,
        }
    }

    fn reference_system_mut(&mut self) -> Option<&mut ReferenceSystem> {
        match self {
            Self::GeodeticCrs(crs) => Some(&mut crs.crs),
            Self::ProjectedCrs(crs) => Some(&mut crs.crs),
            Self::VerticalCrs(crs) => Some(&mut crs.crs),
            Self::EngineeringCrs(crs) => Some(&mut crs.crs),
            Self::CompoundCrs(crs) => Some(&mut crs.crs),
            _ => None,
        }
    }

    /// Area of use, for datums and CRSs.
    #[must_use]
    pub fn domain_of_validity(&self) -> Option<&EntityRef> {
        self.datum()
            .map(|datum| &datum.domain_of_validity)
            .or_else(|| self.reference_system().map(|crs| &crs.domain_of_validity))
    }

    /// Every outgoing reference, list fields in stored order.
    #[must_use]
    pub fn references(&self) -> Vec<Reference<'_>> {
        let mut refs = Vec::new();
        if let Some(area) = self.domain_of_validity() {
            refs.push(Reference::single("domainOfValidity", area));
        }
        match self {
            Self::GeodeticDatum(datum) => {
                refs.push(Reference::single("primeMeridian", &datum.prime_meridian));
                refs.push(Reference::single("ellipsoid", &datum.ellipsoid));
            }
            Self::CoordinateSystemAxis(axis) => {
                refs.push(Reference::single(
                    "descriptionReference",
                    &axis.description_reference,
                ));
            }
            Self::EllipsoidalCs(cs)
            | Self::CartesianCs(cs)
            | Self::VerticalCs(cs)
            | Self::SphericalCs(cs) => {
                refs.extend(cs.axes.iter().enumerate().map(|(position, target)| Reference {
                    field: "axes",
                    position,
                    target,
                }));
            }
            Self::GeodeticCrs(crs) => {
                refs.push(Reference::single("geodeticDatum", &crs.geodetic_datum));
                refs.push(Reference::single("ellipsoidalCS", &crs.ellipsoidal_cs));
            }
            Self::ProjectedCrs(crs) => {
                refs.push(Reference::single("baseGeodeticCRS", &crs.base_geodetic_crs));
                refs.push(Reference::single("cartesianCS", &crs.cartesian_cs));
            }
            Self::VerticalCrs(crs) => {
                refs.push(Reference::single("verticalDatum", &crs.vertical_datum));
                refs.push(Reference::single("verticalCS", &crs.vertical_cs));
            }
            Self::EngineeringCrs(crs) => {
                refs.push(Reference::single("coordinateSystem", &crs.coordinate_system));
                refs.push(Reference::single("engineeringDatum", &crs.engineering_datum));
            }
            Self::CompoundCrs(crs) => {
                refs.extend(crs.component_reference_systems.iter().enumerate().map(
                    |(position, target)| Reference {
                        field: "componentReferenceSystems",
                        position,
                        target,
                    },
                ));
            }
            _ => {}
        }
        refs
    }

    /// Assign a scalar field by its camelCase name, coercing `value` to the
    /// field's declared type.
    ///
    /// Reference fields cannot be assigned this way: they are fixed by the
    /// loader.
    ///
    /// # Examples
    /// ```
    /// use epsg_registry::schema::{DictionaryEntry, Entity};
    ///
    /// let mut entity = Entity::DictionaryEntry(DictionaryEntry::new("urn:x", "old"));
    /// entity.assign("name", "new").unwrap();
    /// assert_eq!(entity.name(), Some("new"));
    /// assert!(entity.assign("ellipsoid", "urn:y").is_err());
    /// ```
    pub fn assign(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let identifier = self.identifier().to_string();

        if let Some(entry) = self.entry_mut() {
            let slot = match field {
                "name" => return assign_text(&mut entry.name, &identifier, field, value),
                "remarks" => Some(&mut entry.remarks),
                "informationSource" => Some(&mut entry.information_source),
                "anchorDefinition" => Some(&mut entry.anchor_definition),
                _ => None,
            };
            if let Some(slot) = slot {
                *slot = optional_text(&identifier, field, value)?;
                return Ok(());
            }
        }

        if let Some(datum) = self.datum_mut() {
            match field {
                "type" => return assign_text(&mut datum.datum_type, &identifier, field, value),
                "scope" => return assign_text(&mut datum.scope, &identifier, field, value),
                "realizationEpoch" => return datum.set_realization_epoch(value),
                _ => {}
            }
        }

        if let Some(crs) = self.reference_system_mut() {
            match field {
                "type" => return assign_text(&mut crs.crs_type, &identifier, field, value),
                "scope" => return assign_text(&mut crs.scope, &identifier, field, value),
                _ => {}
            }
        }

        match (self, field) {
            (Self::PrimeMeridian(pm), "greenwichLongitude") => pm.set_greenwich_longitude(value),
            (Self::Ellipsoid(e), "semiMajorAxis") => e.set_semi_major_axis(value),
            (Self::Ellipsoid(e), "semiMinorAxis") => e.set_semi_minor_axis(value),
            (Self::Ellipsoid(e), "inverseFlattening") => e.set_inverse_flattening(value),
            (Self::Ellipsoid(e), "isSphere") => {
                e.is_sphere = optional_text(&identifier, field, value)?;
                Ok(())
            }
            (Self::AreaOfUse(area), "description") => {
                area.description = optional_text(&identifier, field, value)?;
                Ok(())
            }
            (Self::AreaOfUse(area), field) => match Bound::parse(field) {
                Some(bound) => area.set_bound(bound, value),
                None => Err(no_such_field(&identifier, field)),
            },
            (Self::AxisName(name), "description") => {
                name.description = optional_text(&identifier, field, value)?;
                Ok(())
            }
            (Self::CoordinateSystemAxis(axis), "axisAbbrev") => {
                assign_text(&mut axis.axis_abbrev, &identifier, field, value)
            }
            (Self::CoordinateSystemAxis(axis), "axisDirection") => {
                assign_text(&mut axis.axis_direction, &identifier, field, value)
            }
            (
                Self::EllipsoidalCs(cs)
                | Self::CartesianCs(cs)
                | Self::VerticalCs(cs)
                | Self::SphericalCs(cs),
                "type",
            ) => assign_text(&mut cs.cs_type, &identifier, field, value),
            (_, field) => Err(no_such_field(&identifier, field)),
        }
    }
}

fn no_such_field(identifier: &str, field: &str) -> EpsgError {
    EpsgError::NoSuchField {
        identifier: identifier.to_string(),
        field: field.to_string(),
    }
}

fn optional_text(identifier: &str, field: &str, value: Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::Text(text) => Ok(Some(text)),
        other => Err(EpsgError::TypeCoercion {
            identifier: identifier.to_string(),
            field: field.to_string(),
            expected: "text",
            found: other.describe(),
        }),
    }
}

fn required_text(identifier: &str, field: &str, value: Value) -> Result<String> {
    optional_text(identifier, field, value)?.ok_or_else(|| EpsgError::TypeCoercion {
        identifier: identifier.to_string(),
        field: field.to_string(),
        expected: "text",
        found: "null".to_string(),
    })
}

fn assign_text(slot: &mut String, identifier: &str, field: &str, value: Value) -> Result<()> {
    *slot = required_text(identifier, field, value)?;
    Ok(())
}
