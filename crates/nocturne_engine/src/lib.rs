//! Event dispatch and query-driven processing for Nocturne.
//!
//! This crate layers three pieces on top of the storage crate's `World`:
//!
//! - [`EventBus`] — publish/subscribe with concurrent, failure-isolated
//!   fan-out. One handler's error never disturbs its siblings; it is logged
//!   and excluded from the result list.
//! - [`Runtime`] — the bridge that binds processors (world-aware async
//!   functions) to bus events, one stable wrapper handler per processor.
//! - The query combinators ([`query`], [`query_component_loop`],
//!   [`query_entity_loop`], [`query_entity_component_loop`]) — adapters that
//!   turn per-entity handlers into processors, with early-exit via
//!   [`Flow::Stop`] and optional result aggregation.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod args;
mod bus;
mod processor;
mod query;

pub use args::{Arg, Args};
pub use bus::{EventBus, EventHandler, HandlerId};
pub use processor::{Processor, ProcessorId, Runtime};
pub use query::{
    Aggregator, Flow, WORLD_KEY, query, query_component_loop, query_entity_loop,
    query_entity_component_loop,
};
