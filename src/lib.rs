//! Nocturne - Entity-component runtime with event dispatch
//!
//! This crate re-exports all layers of the Nocturne system for convenient
//! access. For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: nocturne_engine     — Event bus, processor bridge, query combinators
//! Layer 1: nocturne_storage    — Entity-component storage, registry, persistence
//! Layer 0: nocturne_foundation — Core types (Value, EntityId, Error)
//! ```

pub use nocturne_engine as engine;
pub use nocturne_foundation as foundation;
pub use nocturne_storage as storage;
