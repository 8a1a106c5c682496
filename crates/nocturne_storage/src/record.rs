//! The canonical persisted record shape.
//!
//! A record is the flat form the world exchanges with the persistence
//! collaborator: `{ id, components: { "<Kind>": payload } }`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::error;

use nocturne_foundation::{EntityId, Payload, Value};

use crate::component::{Component, ComponentMap};
use crate::registry::ComponentRegistry;

/// Flat per-entity record exchanged with the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// The entity's opaque id.
    pub id: EntityId,
    /// Component payloads keyed by kind name.
    pub components: BTreeMap<String, Payload>,
}

impl EntityRecord {
    /// Creates an empty record for the given id.
    #[must_use]
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            components: BTreeMap::new(),
        }
    }

    /// Encodes an in-memory component map into a record.
    #[must_use]
    pub fn from_components(id: EntityId, components: &ComponentMap) -> Self {
        Self {
            id,
            components: components
                .iter()
                .map(|(kind, component)| (kind.name().to_owned(), component.payload()))
                .collect(),
        }
    }

    /// Builds a record from a raw dynamic value.
    ///
    /// Returns `None` when the value is not a map or has no id field.
    /// Component entries whose payload is not a map are dropped.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_map()?;
        let id = map.get("id")?.as_id()?;

        let mut components = BTreeMap::new();
        if let Some(Value::Map(entries)) = map.get("components") {
            for (kind, payload) in entries {
                if let Value::Map(payload) = payload {
                    components.insert(kind.clone(), payload.clone());
                }
            }
        }
        Some(Self { id, components })
    }

    /// Decodes the record's components through the registry.
    ///
    /// A component whose kind is unregistered, or whose payload fails to
    /// decode, is dropped with a logged error; the rest of the entity loads
    /// normally.
    #[must_use]
    pub fn decode(&self, registry: &ComponentRegistry) -> Vec<Arc<dyn Component>> {
        let mut components = Vec::with_capacity(self.components.len());
        for (kind, payload) in &self.components {
            match registry.decode(kind, payload) {
                Ok(component) => components.push(component),
                Err(err) => {
                    error!(entity = %self.id, kind = %kind, %err, "dropping undecodable component");
                }
            }
        }
        components
    }
}
