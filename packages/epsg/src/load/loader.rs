//! Graph loader that resolves URNs to entities using the rule table.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use roxmltree::Document;

use super::index::IdentifierIndex;
use super::rules::{create_rule_table, Resolver, RuleTable};
use crate::config::MAX_RESOLVE_DEPTH;
use crate::error::{EpsgError, Result};
use crate::schema::{Entity, EntityKind};
use crate::xml::get_tag_name;

/// Memoizing, reference-following entity builder over one GML document.
///
/// Every URN is built at most once per loader: later calls to
/// [`GraphLoader::resolve`] hand out the same `Arc`. Resolution of one
/// requested URN is all-or-nothing. If any entity reached from it fails to
/// build, none of the entities built along the way are memoized, so a
/// failure never leaves a partial entity behind.
pub struct GraphLoader<'a, 'input> {
    index: IdentifierIndex<'a, 'input>,
    rules: RuleTable,
    memo: BTreeMap<String, Arc<Entity>>,
    max_depth: usize,
}

impl<'a, 'input> GraphLoader<'a, 'input> {
    /// Create a loader over `document` with the standard rule table.
    #[must_use]
    pub fn new(document: &'a Document<'input>) -> Self {
        Self::with_rules(document, create_rule_table())
    }

    /// Create a loader with a custom rule table.
    #[must_use]
    pub fn with_rules(document: &'a Document<'input>, rules: RuleTable) -> Self {
        Self {
            index: IdentifierIndex::new(document),
            rules,
            memo: BTreeMap::new(),
            max_depth: MAX_RESOLVE_DEPTH,
        }
    }

    /// Limit how many entities may be under construction at once.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn index(&self) -> &IdentifierIndex<'a, 'input> {
        &self.index
    }

    /// Resolve `urn` to its entity, building it and everything it
    /// references if needed.
    ///
    /// # Errors
    /// `NotFound` if the URN is not in the document or its element has no
    /// rule; `MalformedReference` or `TypeCoercion` if the entity or one of
    /// its dependencies is broken.
    pub fn resolve(&mut self, urn: &str) -> Result<Arc<Entity>> {
        if let Some(entity) = self.memo.get(urn) {
            return Ok(Arc::clone(entity));
        }

        let mut resolution = Resolution {
            index: &self.index,
            rules: &self.rules,
            memo: &self.memo,
            pending: HashMap::new(),
            in_progress: HashMap::new(),
            max_depth: self.max_depth,
        };
        let entity = resolution.build(urn)?;
        let pending = resolution.pending;

        tracing::debug!(urn = %urn, dependencies = pending.len(), "Resolved entity");

        self.memo.extend(
            pending
                .into_iter()
                .map(|(key, entity)| (key, Arc::new(entity))),
        );
        let entity = Arc::new(entity);
        self.memo.insert(urn.to_string(), Arc::clone(&entity));
        Ok(entity)
    }

    /// Resolve every URN in the document, skipping those that are not
    /// loadable. Any other failure aborts the load.
    ///
    /// Returns the number of entities in the memo afterwards.
    pub fn load_all(&mut self) -> Result<usize> {
        let keys: Vec<String> = self.index.keys().map(str::to_string).collect();
        let mut skipped = 0;

        for urn in &keys {
            match self.resolve(urn) {
                Ok(_) => {}
                Err(err) if err.is_not_found() => {
                    tracing::debug!(urn = %urn, error = %err, "Skipping unloadable element");
                    skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }

        tracing::info!(
            identifiers = keys.len(),
            loaded = self.memo.len(),
            skipped,
            "Loaded entity graph"
        );
        Ok(self.memo.len())
    }

    /// Already-resolved entity for `urn`, without building anything.
    #[must_use]
    pub fn get(&self, urn: &str) -> Option<Arc<Entity>> {
        self.memo.get(urn).cloned()
    }

    #[must_use]
    pub fn contains(&self, urn: &str) -> bool {
        self.memo.contains_key(urn)
    }

    /// Number of resolved entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.memo.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    /// Resolved entities, ordered by URN.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.memo.values().map(|entity| &**entity)
    }

    /// Detach the resolved entities from the document.
    #[must_use]
    pub fn into_entities(self) -> EntitySet {
        EntitySet {
            entities: self.memo,
        }
    }
}

/// State of one top-level `resolve` call.
struct Resolution<'l, 'a, 'input> {
    index: &'l IdentifierIndex<'a, 'input>,
    rules: &'l RuleTable,
    memo: &'l BTreeMap<String, Arc<Entity>>,
    /// Entities built during this call, committed only on success.
    pending: HashMap<String, Entity>,
    /// Entities currently being built, by kind.
    in_progress: HashMap<String, EntityKind>,
    max_depth: usize,
}

impl Resolution<'_, '_, '_> {
    fn build(&mut self, urn: &str) -> Result<Entity> {
        let Some(node) = self.index.get(urn) else {
            return Err(EpsgError::NotFound {
                identifier: urn.to_string(),
                tag: None,
            });
        };
        let tag = get_tag_name(node);
        let Some(rule) = self.rules.get(tag) else {
            return Err(EpsgError::NotFound {
                identifier: urn.to_string(),
                tag: Some(tag.to_string()),
            });
        };

        if self.in_progress.len() >= self.max_depth {
            return Err(EpsgError::ReferenceDepthExceeded {
                identifier: urn.to_string(),
                max_depth: self.max_depth,
            });
        }

        tracing::trace!(urn = %urn, tag = %tag, depth = self.in_progress.len(), "Building entity");
        self.in_progress.insert(urn.to_string(), rule.kind());
        let result = rule.build(node, self);
        self.in_progress.remove(urn);
        result
    }
}

impl Resolver for Resolution<'_, '_, '_> {
    fn resolve_kind(&mut self, urn: &str) -> Result<EntityKind> {
        if let Some(entity) = self.memo.get(urn) {
            return Ok(entity.kind());
        }
        if let Some(entity) = self.pending.get(urn) {
            return Ok(entity.kind());
        }
        // Cycle: the entity is further up the chain and will exist once
        // the chain completes.
        if let Some(kind) = self.in_progress.get(urn) {
            return Ok(*kind);
        }

        let entity = self.build(urn)?;
        let kind = entity.kind();
        self.pending.insert(urn.to_string(), entity);
        Ok(kind)
    }
}

/// Entities detached from their source document, keyed by URN.
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    entities: BTreeMap<String, Arc<Entity>>,
}

impl EntitySet {
    #[must_use]
    pub fn get(&self, urn: &str) -> Option<&Arc<Entity>> {
        self.entities.get(urn)
    }

    #[must_use]
    pub fn contains(&self, urn: &str) -> bool {
        self.entities.contains_key(urn)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities ordered by URN.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Entity>> {
        self.entities.values()
    }

    /// Number of entities per concrete kind.
    #[must_use]
    pub fn kind_counts(&self) -> BTreeMap<EntityKind, usize> {
        let mut counts = BTreeMap::new();
        for entity in self.entities.values() {
            *counts.entry(entity.kind()).or_insert(0) += 1;
        }
        counts
    }
}

/// Parse GML text and load every loadable entity in it.
pub fn load_gml(gml: &str) -> Result<EntitySet> {
    let document = Document::parse(gml)?;
    let mut loader = GraphLoader::new(&document);
    loader.load_all()?;
    Ok(loader.into_entities())
}
