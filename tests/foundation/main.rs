//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: values, entity ids, and errors.

mod errors;
