//! The entity store and its derived component index.
//!
//! The `World` owns every live entity plus a derived mapping from component
//! kind to the set of entity ids holding that kind. The index is never
//! authoritative: it is maintained from writes and could be rebuilt from the
//! entity maps at any time. Every mutation commits in-memory state under a
//! single lock acquisition and only then performs the write-through call to
//! the persistence collaborator, so no suspension point ever splits a
//! read-modify-commit.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use tracing::warn;

use nocturne_foundation::{EntityId, Result};

use crate::component::{Component, ComponentKind, ComponentMap, ComponentType, component_map};
use crate::record::EntityRecord;
use crate::registry::ComponentRegistry;
use crate::store::EntityStore;

/// Outcome of [`World::remove_components`].
///
/// "Entity does not exist" and "entity had none of the requested kinds" are
/// distinct, so callers can branch on which happened.
#[derive(Debug)]
pub enum Removal {
    /// The entity does not exist.
    NotFound,
    /// The entity exists but held none of the requested kinds.
    Unchanged,
    /// The removed subset, keyed by kind.
    Removed(ComponentMap),
}

impl Removal {
    /// Returns true if any component was removed.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Removed(_))
    }

    /// Unwraps the removed subset, if any.
    #[must_use]
    pub fn removed(self) -> Option<ComponentMap> {
        match self {
            Self::Removed(map) => Some(map),
            _ => None,
        }
    }
}

#[derive(Default)]
struct WorldState {
    entities: HashMap<EntityId, ComponentMap>,
    /// Derived: `id ∈ index[kind]` iff `entities[id]` holds `kind`.
    /// Entries are created lazily and emptied, never removed.
    index: HashMap<ComponentKind, BTreeSet<EntityId>>,
}

impl WorldState {
    fn record(&self, id: EntityId) -> Option<EntityRecord> {
        self.entities
            .get(&id)
            .map(|components| EntityRecord::from_components(id, components))
    }
}

/// The entity store.
///
/// Owns entities and the derived component index; writes through to the
/// persistence collaborator on every mutation. One live `World` per backing
/// store is assumed.
pub struct World {
    registry: Arc<ComponentRegistry>,
    store: Arc<dyn EntityStore>,
    state: RwLock<WorldState>,
}

impl World {
    /// Creates an empty world over the given registry and store.
    #[must_use]
    pub fn new(registry: Arc<ComponentRegistry>, store: Arc<dyn EntityStore>) -> Self {
        Self {
            registry,
            store,
            state: RwLock::new(WorldState::default()),
        }
    }

    /// Returns the component registry this world decodes with.
    #[must_use]
    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// Returns the persistence collaborator.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    /// Merges components into an entity, creating it when needed.
    ///
    /// With `id = None` a fresh random id is minted. Incoming components
    /// overwrite same-kind entries already on the entity (among the
    /// arguments themselves, the first occurrence of a kind wins);
    /// components not mentioned are preserved. The full resulting record is
    /// written through.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the write-through fails; the in-memory
    /// state is already committed at that point.
    pub async fn add_components(
        &self,
        id: Option<EntityId>,
        components: Vec<Arc<dyn Component>>,
    ) -> Result<EntityId> {
        let incoming = component_map(components);
        let (id, record) = {
            let mut guard = self.state.write().expect("world state lock poisoned");
            let state = &mut *guard;
            let id = id.unwrap_or_else(EntityId::random);

            let kinds: Vec<ComponentKind> = incoming.keys().copied().collect();
            let entry = state.entities.entry(id).or_default();
            for (kind, component) in incoming {
                entry.insert(kind, component);
            }
            for kind in kinds {
                state.index.entry(kind).or_default().insert(id);
            }

            let record = state.record(id).expect("entity just written");
            (id, record)
        };

        self.store.save(record).await?;
        Ok(id)
    }

    /// Removes the requested kinds from an entity.
    ///
    /// The record is re-persisted whenever the entity exists, even when
    /// nothing was removed or the entity became empty.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the write-through fails.
    pub async fn remove_components(
        &self,
        id: EntityId,
        kinds: &[ComponentKind],
    ) -> Result<Removal> {
        let (removed, record) = {
            let mut guard = self.state.write().expect("world state lock poisoned");
            let state = &mut *guard;
            let Some(entry) = state.entities.get_mut(&id) else {
                return Ok(Removal::NotFound);
            };

            let mut removed = ComponentMap::new();
            for kind in kinds {
                if let Some(component) = entry.remove(kind) {
                    removed.insert(*kind, component);
                    if let Some(ids) = state.index.get_mut(kind) {
                        ids.remove(&id);
                    }
                }
            }

            let record = state.record(id).expect("entity checked above");
            (removed, record)
        };

        self.store.save(record).await?;
        Ok(if removed.is_empty() {
            Removal::Unchanged
        } else {
            Removal::Removed(removed)
        })
    }

    /// Destroys an entity, pruning the index and deleting its record.
    ///
    /// Returns the entity's final component map, or `None` when it did not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the record deletion fails.
    pub async fn remove_entity(&self, id: EntityId) -> Result<Option<ComponentMap>> {
        let removed = {
            let mut guard = self.state.write().expect("world state lock poisoned");
            let state = &mut *guard;
            let Some(components) = state.entities.remove(&id) else {
                return Ok(None);
            };
            for kind in components.keys() {
                if let Some(ids) = state.index.get_mut(kind) {
                    ids.remove(&id);
                }
            }
            components
        };

        self.store.delete(id).await?;
        Ok(Some(removed))
    }

    /// Returns an entity's components.
    ///
    /// With no kinds given, returns the full component map; otherwise the
    /// present subset, which may be smaller than requested. `None` means the
    /// entity does not exist.
    #[must_use]
    pub fn components(&self, id: EntityId, kinds: &[ComponentKind]) -> Option<ComponentMap> {
        let guard = self.state.read().expect("world state lock poisoned");
        let entry = guard.entities.get(&id)?;
        if kinds.is_empty() {
            return Some(entry.clone());
        }
        Some(
            kinds
                .iter()
                .filter_map(|kind| entry.get(kind).map(|c| (*kind, Arc::clone(c))))
                .collect(),
        )
    }

    /// Returns a typed copy of one component.
    #[must_use]
    pub fn get<T: ComponentType>(&self, id: EntityId) -> Option<T> {
        let guard = self.state.read().expect("world state lock poisoned");
        guard
            .entities
            .get(&id)?
            .get(&T::KIND)
            .and_then(|component| component.downcast_ref::<T>().cloned())
    }

    /// Returns true if the entity exists.
    #[must_use]
    pub fn has_entity(&self, id: EntityId) -> bool {
        self.state
            .read()
            .expect("world state lock poisoned")
            .entities
            .contains_key(&id)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.state
            .read()
            .expect("world state lock poisoned")
            .entities
            .len()
    }

    /// Returns the ids of entities holding every one of the given kinds.
    ///
    /// An unseen kind intersects as the empty set. With zero kinds, returns
    /// the set of all stored entity ids.
    #[must_use]
    pub fn query(&self, kinds: &[ComponentKind]) -> BTreeSet<EntityId> {
        let mut guard = self.state.write().expect("world state lock poisoned");
        let state = &mut *guard;

        if kinds.is_empty() {
            return state.entities.keys().copied().collect();
        }

        // Index entries materialize on first query and stay for the life of
        // the world.
        for kind in kinds {
            state.index.entry(*kind).or_default();
        }

        let mut result = state.index[&kinds[0]].clone();
        for kind in &kinds[1..] {
            let ids = &state.index[kind];
            result.retain(|id| ids.contains(id));
            if result.is_empty() {
                break;
            }
        }
        result
    }

    /// Re-derives an entity's record and forwards it to the store.
    ///
    /// A no-op with a logged warning when the entity does not exist.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the write fails.
    pub async fn save_entity(&self, id: EntityId) -> Result<()> {
        let record = {
            let guard = self.state.read().expect("world state lock poisoned");
            guard.record(id)
        };
        match record {
            Some(record) => self.store.save(record).await,
            None => {
                warn!(entity = %id, "tried to save entity that does not exist");
                Ok(())
            }
        }
    }

    /// Encodes an entity's current in-memory state as a record.
    #[must_use]
    pub fn record(&self, id: EntityId) -> Option<EntityRecord> {
        self.state
            .read()
            .expect("world state lock poisoned")
            .record(id)
    }

    /// Bulk-loads records from the external serialized form.
    ///
    /// Each record's components are decoded through the registry; unknown or
    /// malformed components are dropped with a logged error and the rest of
    /// that entity loads normally. Loaded entities flow through the normal
    /// write path, so the index is rebuilt as a side effect rather than
    /// trusted from persisted state. Returns the number of entities loaded.
    ///
    /// # Errors
    ///
    /// Returns a storage error when a write-through fails.
    pub async fn add_entities(&self, records: Vec<EntityRecord>) -> Result<usize> {
        let mut loaded = 0;
        for record in records {
            let components = record.decode(&self.registry);
            self.add_components(Some(record.id), components).await?;
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Loads every record from the store into the world.
    ///
    /// # Errors
    ///
    /// Returns a storage error when loading or a write-through fails.
    pub async fn load_all(&self) -> Result<usize> {
        let records = self.store.load_all().await?;
        self.add_entities(records).await
    }
}
