//! Map-backed entity store.

use std::collections::BTreeMap;

use super::EntityStore;
use crate::error::{EpsgError, Result};
use crate::schema::{Entity, EntityClass};

/// Entity store holding everything in a `BTreeMap`.
///
/// Bulk replacement builds the new map aside and swaps it in, so a failed
/// load leaves the previous contents untouched.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: BTreeMap<String, Entity>,
    initialised: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntityStore for MemoryStore {
    fn recreate_schema(&mut self) -> Result<()> {
        self.entities.clear();
        self.initialised = true;
        Ok(())
    }

    fn replace_all<'e, I>(&mut self, entities: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'e Entity>,
    {
        let mut replacement = BTreeMap::new();
        for entity in entities {
            let identifier = entity.identifier().to_string();
            if replacement.contains_key(&identifier) {
                return Err(EpsgError::DuplicateIdentifier(identifier));
            }
            replacement.insert(identifier, entity.clone());
        }

        let inserted = replacement.len();
        self.entities = replacement;
        self.initialised = true;
        Ok(inserted)
    }

    fn get(&self, identifier: &str) -> Result<Option<Entity>> {
        Ok(self.entities.get(identifier).cloned())
    }

    fn put(&mut self, entity: &Entity) -> Result<()> {
        self.entities
            .insert(entity.identifier().to_string(), entity.clone());
        self.initialised = true;
        Ok(())
    }

    fn put_all<'e, I>(&mut self, entities: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'e Entity>,
    {
        let mut written = 0;
        for entity in entities {
            self.put(entity)?;
            written += 1;
        }
        self.initialised = true;
        Ok(written)
    }

    fn remove(&mut self, identifier: &str) -> Result<bool> {
        Ok(self.entities.remove(identifier).is_some())
    }

    fn contains(&self, identifier: &str) -> Result<bool> {
        Ok(self.entities.contains_key(identifier))
    }

    fn count(&self) -> Result<usize> {
        Ok(self.entities.len())
    }

    fn identifiers(&self) -> Result<Vec<String>> {
        Ok(self.entities.keys().cloned().collect())
    }

    fn entries(&self) -> Result<Vec<Entity>> {
        Ok(self.entities.values().cloned().collect())
    }

    fn query(&self, class: EntityClass) -> Result<Vec<Entity>> {
        Ok(self
            .entities
            .values()
            .filter(|entity| entity.kind().is_a(class))
            .cloned()
            .collect())
    }

    fn referenced_by(&self, identifier: &str) -> Result<Vec<String>> {
        Ok(self
            .entities
            .iter()
            .filter(|(_, entity)| {
                entity
                    .references()
                    .iter()
                    .any(|reference| reference.target.as_str() == identifier)
            })
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn clear(&mut self) -> Result<()> {
        self.entities.clear();
        Ok(())
    }

    fn is_initialised(&self) -> bool {
        self.initialised
    }
}
