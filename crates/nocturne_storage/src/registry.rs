//! Kind-string to decoder mapping.
//!
//! The registry is only consulted during decode: a live component already
//! knows its own kind, so encode never needs it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use nocturne_foundation::{Error, Payload, Result};

use crate::component::{Component, ComponentType};

type DecodeFn = fn(&Payload) -> Result<Arc<dyn Component>>;

fn decode_erased<T: ComponentType>(payload: &Payload) -> Result<Arc<dyn Component>> {
    Ok(Arc::new(T::decode(payload)?))
}

static GLOBAL: Lazy<ComponentRegistry> = Lazy::new(ComponentRegistry::new);

/// Maps component kind names to decode functions.
///
/// Registration is idempotent: the first registration for a kind wins and
/// later ones are silently ignored.
#[derive(Default)]
pub struct ComponentRegistry {
    decoders: RwLock<HashMap<&'static str, DecodeFn>>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide default registry.
    ///
    /// Worlds take an explicit registry; this instance exists for
    /// application wiring where one shared registry is enough.
    #[must_use]
    pub fn global() -> &'static ComponentRegistry {
        &GLOBAL
    }

    /// Registers a component type. Idempotent; first registration wins.
    pub fn register<T: ComponentType>(&self) {
        let mut decoders = self.decoders.write().expect("registry lock poisoned");
        decoders.entry(T::KIND.name()).or_insert(decode_erased::<T>);
    }

    /// Returns true if the kind name has a registered decoder.
    #[must_use]
    pub fn is_registered(&self, kind: &str) -> bool {
        self.decoders
            .read()
            .expect("registry lock poisoned")
            .contains_key(kind)
    }

    /// Returns the number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decoders.read().expect("registry lock poisoned").len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes a component from its kind name and payload.
    ///
    /// # Errors
    ///
    /// Returns [`nocturne_foundation::ErrorKind::ComponentNotRegistered`]
    /// when the kind is unknown, or the decoder's own error when the payload
    /// is malformed.
    pub fn decode(&self, kind: &str, payload: &Payload) -> Result<Arc<dyn Component>> {
        let decode = {
            let decoders = self.decoders.read().expect("registry lock poisoned");
            decoders
                .get(kind)
                .copied()
                .ok_or_else(|| Error::not_registered(kind))?
        };
        decode(payload)
    }
}
