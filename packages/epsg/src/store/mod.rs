//! Entity persistence.
//!
//! [`EntityStore`] is the storage contract the registry facade relies on:
//! transactional bulk replacement, atomic single-entity writes, and lookup
//! by identifier or by (possibly abstract) class. [`SqliteStore`] is the
//! production implementation; [`MemoryStore`] keeps everything in a map.

mod memory;
mod schema;
mod sqlite;

pub use memory::MemoryStore;
pub use schema::SCHEMA_VERSION;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::schema::{Entity, EntityClass};

/// Storage contract for entities keyed by identifier.
pub trait EntityStore {
    /// Drop and re-create the schema, discarding every entity.
    fn recreate_schema(&mut self) -> Result<()>;

    /// Re-create the schema and insert `entities`, all in one transaction.
    ///
    /// On failure the store is left exactly as it was. Two entities with
    /// the same identifier are an error.
    fn replace_all<'e, I>(&mut self, entities: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'e Entity>;

    fn get(&self, identifier: &str) -> Result<Option<Entity>>;

    /// Insert or replace one entity atomically.
    fn put(&mut self, entity: &Entity) -> Result<()>;

    /// Insert or replace every entity in `entities` in one transaction,
    /// keeping whatever else is stored.
    fn put_all<'e, I>(&mut self, entities: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'e Entity>;

    /// Remove an entity. Returns whether it existed.
    fn remove(&mut self, identifier: &str) -> Result<bool>;

    fn contains(&self, identifier: &str) -> Result<bool>;

    fn count(&self) -> Result<usize>;

    /// All identifiers, sorted.
    fn identifiers(&self) -> Result<Vec<String>>;

    /// All entities, sorted by identifier.
    fn entries(&self) -> Result<Vec<Entity>>;

    /// Entities whose kind belongs to `class`, sorted by identifier.
    /// Abstract classes match every concrete subtype.
    fn query(&self, class: EntityClass) -> Result<Vec<Entity>>;

    /// Identifiers of entities holding a reference to `identifier`, sorted.
    fn referenced_by(&self, identifier: &str) -> Result<Vec<String>>;

    /// Remove every entity, keeping the schema.
    fn clear(&mut self) -> Result<()>;

    /// Whether the schema exists.
    fn is_initialised(&self) -> bool;
}
