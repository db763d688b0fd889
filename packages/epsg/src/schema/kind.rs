//! Discriminators for the entity taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Concrete entity variant, stored as the `class` discriminator.
///
/// The string form equals the GML element name the variant is loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    DictionaryEntry,
    PrimeMeridian,
    Ellipsoid,
    AreaOfUse,
    GeodeticDatum,
    VerticalDatum,
    EngineeringDatum,
    AxisName,
    CoordinateSystemAxis,
    #[serde(rename = "EllipsoidalCS")]
    EllipsoidalCs,
    #[serde(rename = "CartesianCS")]
    CartesianCs,
    #[serde(rename = "VerticalCS")]
    VerticalCs,
    #[serde(rename = "SphericalCS")]
    SphericalCs,
    #[serde(rename = "GeodeticCRS")]
    GeodeticCrs,
    #[serde(rename = "ProjectedCRS")]
    ProjectedCrs,
    #[serde(rename = "VerticalCRS")]
    VerticalCrs,
    #[serde(rename = "EngineeringCRS")]
    EngineeringCrs,
    #[serde(rename = "CompoundCRS")]
    CompoundCrs,
}

impl EntityKind {
    /// Every concrete variant.
    pub const ALL: [EntityKind; 18] = [
        Self::DictionaryEntry,
        Self::PrimeMeridian,
        Self::Ellipsoid,
        Self::AreaOfUse,
        Self::GeodeticDatum,
        Self::VerticalDatum,
        Self::EngineeringDatum,
        Self::AxisName,
        Self::CoordinateSystemAxis,
        Self::EllipsoidalCs,
        Self::CartesianCs,
        Self::VerticalCs,
        Self::SphericalCs,
        Self::GeodeticCrs,
        Self::ProjectedCrs,
        Self::VerticalCrs,
        Self::EngineeringCrs,
        Self::CompoundCrs,
    ];

    /// Discriminator / element name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DictionaryEntry => "DictionaryEntry",
            Self::PrimeMeridian => "PrimeMeridian",
            Self::Ellipsoid => "Ellipsoid",
            Self::AreaOfUse => "AreaOfUse",
            Self::GeodeticDatum => "GeodeticDatum",
            Self::VerticalDatum => "VerticalDatum",
            Self::EngineeringDatum => "EngineeringDatum",
            Self::AxisName => "AxisName",
            Self::CoordinateSystemAxis => "CoordinateSystemAxis",
            Self::EllipsoidalCs => "EllipsoidalCS",
            Self::CartesianCs => "CartesianCS",
            Self::VerticalCs => "VerticalCS",
            Self::SphericalCs => "SphericalCS",
            Self::GeodeticCrs => "GeodeticCRS",
            Self::ProjectedCrs => "ProjectedCRS",
            Self::VerticalCrs => "VerticalCRS",
            Self::EngineeringCrs => "EngineeringCRS",
            Self::CompoundCrs => "CompoundCRS",
        }
    }

    /// Parse a discriminator / element name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Check whether this variant belongs to `class`.
    ///
    /// # Examples
    /// ```
    /// use epsg_registry::schema::{EntityClass, EntityKind};
    ///
    /// assert!(EntityKind::ProjectedCrs.is_a(EntityClass::CoordinateReferenceSystem));
    /// assert!(EntityKind::ProjectedCrs.is_a(EntityClass::DictionaryEntry));
    /// assert!(!EntityKind::CoordinateSystemAxis.is_a(EntityClass::DictionaryEntry));
    /// ```
    #[must_use]
    pub fn is_a(self, class: EntityClass) -> bool {
        match class {
            EntityClass::Any => true,
            EntityClass::DictionaryEntry => self != Self::CoordinateSystemAxis,
            EntityClass::Datum => matches!(
                self,
                Self::GeodeticDatum | Self::VerticalDatum | Self::EngineeringDatum
            ),
            EntityClass::CoordinateSystem => matches!(
                self,
                Self::EllipsoidalCs | Self::CartesianCs | Self::VerticalCs | Self::SphericalCs
            ),
            EntityClass::CoordinateReferenceSystem => matches!(
                self,
                Self::GeodeticCrs
                    | Self::ProjectedCrs
                    | Self::VerticalCrs
                    | Self::EngineeringCrs
                    | Self::CompoundCrs
            ),
            EntityClass::Kind(kind) => self == kind,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queryable class: a concrete variant or one of the abstract bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityClass {
    /// Every entity, axes included.
    Any,
    /// Every named, documented entry (everything but axes).
    DictionaryEntry,
    Datum,
    CoordinateSystem,
    CoordinateReferenceSystem,
    /// Exactly one concrete variant.
    Kind(EntityKind),
}

impl EntityClass {
    /// Concrete variants that satisfy this class.
    #[must_use]
    pub fn kinds(self) -> Vec<EntityKind> {
        EntityKind::ALL
            .into_iter()
            .filter(|kind| kind.is_a(self))
            .collect()
    }

    /// Class name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::DictionaryEntry => "DictionaryEntry",
            Self::Datum => "Datum",
            Self::CoordinateSystem => "CoordinateSystem",
            Self::CoordinateReferenceSystem => "CoordinateReferenceSystem",
            Self::Kind(kind) => kind.as_str(),
        }
    }

    /// Parse a class name. `DictionaryEntry` means the abstract base.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Any" => Some(Self::Any),
            "DictionaryEntry" => Some(Self::DictionaryEntry),
            "Datum" => Some(Self::Datum),
            "CoordinateSystem" => Some(Self::CoordinateSystem),
            "CoordinateReferenceSystem" => Some(Self::CoordinateReferenceSystem),
            other => EntityKind::parse(other).map(Self::Kind),
        }
    }
}

impl From<EntityKind> for EntityClass {
    fn from(kind: EntityKind) -> Self {
        Self::Kind(kind)
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
