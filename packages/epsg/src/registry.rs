//! Registry facade: URN-keyed access to a persisted entity graph.

use roxmltree::Document;

use crate::config::{Source, StoreConfig};
use crate::error::{EpsgError, Result};
use crate::load::GraphLoader;
use crate::schema::{Entity, EntityClass, Value};
use crate::service::fetch_gml;
use crate::store::{EntityStore, SqliteStore};

/// Local copy of the EPSG registry.
///
/// Entities are keyed by URN and live in an [`EntityStore`]; the facade only
/// sequences loader output into storage calls. A missing key is
/// `EpsgError::NotFound`, everything else coming out of the store is a hard
/// failure.
///
/// # Example
/// ```
/// use epsg_registry::{Registry, StoreConfig};
///
/// let registry = Registry::open(&StoreConfig::InMemory).unwrap();
/// assert_eq!(registry.count().unwrap(), 0);
/// assert!(registry.get("urn:ogc:def:crs:EPSG::4326").unwrap_err().is_not_found());
/// ```
#[derive(Debug)]
pub struct Registry<S: EntityStore = SqliteStore> {
    store: S,
}

impl Registry<SqliteStore> {
    /// Open the SQLite database described by `config`.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(SqliteStore::open(config)?))
    }
}

impl<S: EntityStore> Registry<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Whether the backing store holds a registry schema.
    #[must_use]
    pub fn is_initialised(&self) -> bool {
        self.store.is_initialised()
    }

    /// Entity stored under `key`.
    ///
    /// # Errors
    /// `NotFound` if there is none.
    pub fn get(&self, key: &str) -> Result<Entity> {
        self.store.get(key)?.ok_or_else(|| EpsgError::NotFound {
            identifier: key.to_string(),
            tag: None,
        })
    }

    /// Store `entity` under `key`, replacing any previous value atomically.
    ///
    /// # Errors
    /// `IdentifierMismatch` if `key` is not the entity's own identifier.
    pub fn set(&mut self, key: &str, entity: &Entity) -> Result<()> {
        if entity.identifier() != key {
            return Err(EpsgError::IdentifierMismatch {
                key: key.to_string(),
                identifier: entity.identifier().to_string(),
            });
        }
        self.store.put(entity)
    }

    /// Remove the entity stored under `key`.
    ///
    /// # Errors
    /// `NotFound` if there is none.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        if self.store.remove(key)? {
            Ok(())
        } else {
            Err(EpsgError::NotFound {
                identifier: key.to_string(),
                tag: None,
            })
        }
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        self.store.contains(key)
    }

    pub fn count(&self) -> Result<usize> {
        self.store.count()
    }

    /// Stored URNs, sorted.
    pub fn identifiers(&self) -> Result<Vec<String>> {
        self.store.identifiers()
    }

    /// Stored entities, sorted by URN.
    pub fn entries(&self) -> Result<Vec<Entity>> {
        self.store.entries()
    }

    /// `(URN, entity)` pairs, sorted by URN.
    pub fn iter(&self) -> Result<impl Iterator<Item = (String, Entity)>> {
        Ok(self
            .store
            .entries()?
            .into_iter()
            .map(|entity| (entity.identifier().to_string(), entity)))
    }

    /// Entities of `class`, including every concrete subtype of an
    /// abstract class.
    pub fn query(&self, class: EntityClass) -> Result<Vec<Entity>> {
        self.store.query(class)
    }

    /// URNs of the entities that reference `key`.
    pub fn referenced_by(&self, key: &str) -> Result<Vec<String>> {
        self.store.referenced_by(key)
    }

    /// Remove every entity, keeping the schema.
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear()
    }

    /// Drop and re-create the schema, then populate it from `loader` if
    /// given. Both happen in one transaction.
    ///
    /// Returns the number of entities stored.
    pub fn init(&mut self, loader: Option<&GraphLoader<'_, '_>>) -> Result<usize> {
        match loader {
            Some(loader) => self.store.replace_all(loader.entities()),
            None => {
                self.store.recreate_schema()?;
                Ok(0)
            }
        }
    }

    /// Replace the registry contents with every loadable entity of `source`.
    ///
    /// Fetching, parsing and loading all happen before the store is touched;
    /// the store is then replaced in one transaction, so any failure leaves
    /// the previous contents in place.
    pub fn bulk_load(&mut self, source: &Source) -> Result<usize> {
        tracing::info!(source = %source.describe(), "Bulk loading registry");
        let gml = fetch_gml(source)?;
        let document = Document::parse(&gml)?;
        let mut loader = GraphLoader::new(&document);
        loader.load_all()?;
        self.init(Some(&loader))
    }

    /// Insert or replace every entity in `entities`, keeping the rest.
    ///
    /// Copy from a loader with `loader.entities()` or from another registry
    /// with `&other.entries()?`.
    pub fn update_from<'e, I>(&mut self, entities: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'e Entity>,
    {
        let written = self.store.put_all(entities)?;
        tracing::debug!(entities = written, "Updated registry");
        Ok(written)
    }

    /// Assign `field` of the entity under `key` and persist the result.
    ///
    /// Returns the updated entity. Nothing is written if the assignment
    /// fails.
    pub fn assign(&mut self, key: &str, field: &str, value: impl Into<Value>) -> Result<Entity> {
        let mut entity = self.get(key)?;
        entity.assign(field, value)?;
        self.store.put(&entity)?;
        Ok(entity)
    }

    /// Change the name of the entity under `key`.
    pub fn rename(&mut self, key: &str, name: &str) -> Result<Entity> {
        self.assign(key, "name", name)
    }
}
