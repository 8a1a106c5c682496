//! Entity-component storage, component registry, and persistence boundary for Nocturne.
//!
//! This crate provides:
//! - [`Component`] / [`ComponentType`] - The component data contract
//! - [`ComponentRegistry`] - Kind-string to decoder mapping used during load
//! - [`EntityRecord`] - The canonical persisted record shape
//! - [`EntityStore`] - The persistence collaborator boundary
//! - [`World`] - The entity store with its derived component index

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod component;
mod record;
mod registry;
mod store;
pub mod testing;
mod world;

pub use component::{
    Component, ComponentKind, ComponentMap, ComponentType, component_map, components_equal, erase,
};
pub use record::EntityRecord;
pub use registry::ComponentRegistry;
pub use store::{EntityStore, FileStore, MemoryStore, StoreConfig};
pub use world::{Removal, World};
