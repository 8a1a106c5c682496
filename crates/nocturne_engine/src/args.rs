//! The handler calling convention.
//!
//! Every handler and processor receives one [`Args`] map. Event publishers
//! put ordinary data in as [`Arg::Value`]; the query combinators inject their
//! per-iteration payloads as the typed variants, so a handler can tell a
//! queried id set apart from a value that merely happens to look like one.

use std::collections::{BTreeMap, BTreeSet};

use nocturne_foundation::{EntityId, Value};
use nocturne_storage::ComponentMap;

/// One named argument.
#[derive(Clone, Debug)]
pub enum Arg {
    /// Ordinary event data.
    Value(Value),
    /// A queried id set, injected by [`crate::query`].
    Ids(BTreeSet<EntityId>),
    /// One entity's component subset, injected by
    /// [`crate::query_component_loop`].
    Components(ComponentMap),
    /// One entity id, injected by [`crate::query_entity_loop`].
    Entity(EntityId),
    /// One entity id with its full component map, injected by
    /// [`crate::query_entity_component_loop`].
    EntityComponents(EntityId, ComponentMap),
}

/// String-keyed argument map passed to handlers and processors.
#[derive(Clone, Debug, Default)]
pub struct Args {
    values: BTreeMap<String, Arg>,
}

impl Args {
    /// Creates an empty argument map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an argument, replacing any existing entry under the key.
    pub fn insert(&mut self, key: impl Into<String>, arg: Arg) {
        self.values.insert(key.into(), arg);
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, arg: Arg) -> Self {
        self.insert(key, arg);
        self
    }

    /// Builder-style insert of ordinary event data.
    #[must_use]
    pub fn with_value(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(key, Arg::Value(value.into()))
    }

    /// Returns the argument under a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Arg> {
        self.values.get(key)
    }

    /// Returns the value under a key, when it is ordinary event data.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        match self.values.get(key)? {
            Arg::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the id set under a key, when one was injected there.
    #[must_use]
    pub fn ids(&self, key: &str) -> Option<&BTreeSet<EntityId>> {
        match self.values.get(key)? {
            Arg::Ids(ids) => Some(ids),
            _ => None,
        }
    }

    /// Returns the component subset under a key, when one was injected there.
    #[must_use]
    pub fn components(&self, key: &str) -> Option<&ComponentMap> {
        match self.values.get(key)? {
            Arg::Components(components) => Some(components),
            _ => None,
        }
    }

    /// Returns the entity id under a key, when one was injected there.
    #[must_use]
    pub fn entity(&self, key: &str) -> Option<EntityId> {
        match self.values.get(key)? {
            Arg::Entity(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the (id, component map) pair under a key, when one was
    /// injected there.
    #[must_use]
    pub fn entity_components(&self, key: &str) -> Option<(EntityId, &ComponentMap)> {
        match self.values.get(key)? {
            Arg::EntityComponents(id, components) => Some((*id, components)),
            _ => None,
        }
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no arguments are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
