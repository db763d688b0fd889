//! EPSG Registry - Load the EPSG geodetic parameter dataset into a typed
//! object graph and keep a local, queryable copy of it.
//!
//! The online EPSG registry publishes its dataset as one large GML
//! dictionary. This crate parses that dictionary into strongly typed
//! entities (datums, ellipsoids, coordinate systems, coordinate reference
//! systems and their supporting reference data), following the `xlink:href`
//! cross-references between them, and persists the result in SQLite behind
//! a URN-keyed facade.
//!
//! # Example
//!
//! ```
//! use epsg_registry::{Registry, Source, StoreConfig};
//!
//! let gml = r#"<gml:Dictionary xmlns:gml="http://www.opengis.net/gml/3.2">
//!   <gml:dictionaryEntry><gml:PrimeMeridian>
//!     <gml:identifier>urn:ogc:def:meridian:EPSG::8901</gml:identifier>
//!     <gml:name>Greenwich</gml:name>
//!     <gml:greenwichLongitude>0</gml:greenwichLongitude>
//!   </gml:PrimeMeridian></gml:dictionaryEntry>
//! </gml:Dictionary>"#;
//!
//! let mut registry = Registry::open(&StoreConfig::InMemory).unwrap();
//! registry.bulk_load(&Source::Gml(gml.to_string())).unwrap();
//!
//! let greenwich = registry.get("urn:ogc:def:meridian:EPSG::8901").unwrap();
//! assert_eq!(greenwich.name(), Some("Greenwich"));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants, URN validation, source and store selection
//! - [`error`]: Error types and Result alias
//! - [`xml`]: XML navigation helpers
//! - [`schema`]: The entity model
//! - [`load`]: Identifier index, construction rules and the graph loader
//! - [`store`]: Entity persistence (SQLite and in-memory)
//! - [`http`]: HTTP client with retries
//! - [`service`]: Export from the online registry
//! - [`registry`]: URN-keyed facade over a store
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod load;
pub mod registry;
pub mod schema;
pub mod service;
pub mod store;
pub mod xml;

// Re-export commonly used items
pub use config::{validate_urn, ServiceConfig, Source, StoreConfig};
pub use error::{EpsgError, Result};
pub use load::{load_gml, EntitySet, GraphLoader};
pub use registry::Registry;
pub use schema::{Entity, EntityClass, EntityKind, EntityRef, Value};
pub use service::{fetch_gml, RegistryService};
pub use store::{EntityStore, MemoryStore, SqliteStore};
