//! Integration tests for Layer 2: Engine
//!
//! Tests for the event bus, the processor bridge, and the query combinators.

mod processors;
mod queries;
