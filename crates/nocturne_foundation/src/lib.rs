//! Core types, values, and errors for Nocturne.
//!
//! This crate provides:
//! - [`EntityId`] - Opaque 128-bit random entity identifiers
//! - [`Value`] - The dynamic value type for component payloads and event data
//! - [`Payload`] - The flat key-value encoding of a single component
//! - [`Error`] - Error types shared across the workspace

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod id;
mod value;

pub use error::{Error, ErrorKind, Result};
pub use id::EntityId;
pub use value::{Payload, Value};
