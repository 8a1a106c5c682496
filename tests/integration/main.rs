//! End-to-end tests across all layers.
//!
//! Drives the full stack: components through the registry, world state over a
//! real store, and processors dispatched from the bus.
