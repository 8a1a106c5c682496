//! The component data contract.
//!
//! Components are named, equality-comparable values with a canonical flat
//! key-value encoding. The typed contract lives on [`ComponentType`]; the
//! object-safe erased form [`Component`] is blanket-implemented so that
//! heterogeneous maps can hold any component behind `Arc<dyn Component>`.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use nocturne_foundation::{Payload, Result};

/// Stable discriminant naming a component type.
///
/// The name doubles as the key in persisted records, so it must stay stable
/// across releases for stored entities to load.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentKind(&'static str);

impl ComponentKind {
    /// Creates a kind from its stable name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the stable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentKind({})", self.0)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Typed component contract.
///
/// Implementors are plain value types: `Clone + Debug + PartialEq` plus a
/// stable kind constant and the canonical encode/decode pair. The erased
/// [`Component`] form comes for free via a blanket impl.
pub trait ComponentType: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Stable discriminant for this component type.
    const KIND: ComponentKind;

    /// Encodes this component into its canonical flat payload.
    fn encode(&self) -> Payload;

    /// Reconstructs a component from its canonical payload.
    ///
    /// # Errors
    ///
    /// Returns a decode error when the payload is missing a required field
    /// or a field has the wrong value type.
    fn decode(payload: &Payload) -> Result<Self>;
}

/// Object-safe erased component.
///
/// Exactly one instance of a given kind may exist per entity. Two components
/// are equal iff they have the same kind and equal payload, which
/// [`Component::component_eq`] checks via downcast.
pub trait Component: fmt::Debug + Send + Sync + 'static {
    /// Returns this component's kind.
    fn kind(&self) -> ComponentKind;

    /// Encodes this component into its canonical flat payload.
    fn payload(&self) -> Payload;

    /// Upcast for downcasting support.
    fn as_any(&self) -> &dyn Any;

    /// Value equality across the erasure boundary.
    fn component_eq(&self, other: &dyn Component) -> bool;
}

impl<T: ComponentType> Component for T {
    fn kind(&self) -> ComponentKind {
        T::KIND
    }

    fn payload(&self) -> Payload {
        ComponentType::encode(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn component_eq(&self, other: &dyn Component) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

impl dyn Component {
    /// Returns true if the erased component is a `T`.
    #[must_use]
    pub fn is<T: ComponentType>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcasts the erased component to a `T`.
    #[must_use]
    pub fn downcast_ref<T: ComponentType>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for dyn Component {
    fn eq(&self, other: &Self) -> bool {
        self.component_eq(other)
    }
}

/// Mapping from component kind to component value.
///
/// `BTreeMap` keeps iteration deterministic; `Arc` values make snapshots
/// cheap to clone.
pub type ComponentMap = BTreeMap<ComponentKind, Arc<dyn Component>>;

/// Erases a typed component for storage.
#[must_use]
pub fn erase<T: ComponentType>(component: T) -> Arc<dyn Component> {
    Arc::new(component)
}

/// Collects components into a [`ComponentMap`].
///
/// When the same kind appears more than once, the first occurrence wins.
#[must_use]
pub fn component_map(
    components: impl IntoIterator<Item = Arc<dyn Component>>,
) -> ComponentMap {
    let mut map = ComponentMap::new();
    for component in components {
        map.entry(component.kind()).or_insert(component);
    }
    map
}

/// Compares two component maps for component-wise value equality.
#[must_use]
pub fn components_equal(a: &ComponentMap, b: &ComponentMap) -> bool {
    a.len() == b.len()
        && a.iter().all(|(kind, component)| {
            b.get(kind)
                .is_some_and(|other| component.component_eq(other.as_ref()))
        })
}
