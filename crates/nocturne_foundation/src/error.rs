//! Error types for the Nocturne runtime.
//!
//! Uses `thiserror` for ergonomic error definition.

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Nocturne operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an invalid-parameter error.
    ///
    /// Raised at wiring time when a combinator is constructed with an
    /// unusable result key; fatal to that wiring, not handled at runtime.
    #[must_use]
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParameter(message.into()))
    }

    /// Creates a component-not-registered error.
    #[must_use]
    pub fn not_registered(kind: impl Into<String>) -> Self {
        Self::new(ErrorKind::ComponentNotRegistered(kind.into()))
    }

    /// Creates a missing-field decode error.
    #[must_use]
    pub fn missing_field(component: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingField {
            component: component.into(),
            field: field.into(),
        })
    }

    /// Creates a field-type decode error.
    #[must_use]
    pub fn field_type(
        component: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::FieldType {
            component: component.into(),
            field: field.into(),
            expected: expected.into(),
        })
    }

    /// Creates a storage error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A combinator was constructed with an unusable result key.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Registry lookup miss during decode.
    ///
    /// Recoverable: the owning entity loads with that component dropped.
    #[error("component kind not registered: {0}")]
    ComponentNotRegistered(String),

    /// A component payload was missing a required field during decode.
    #[error("component {component}: missing field {field}")]
    MissingField {
        /// The component kind being decoded.
        component: String,
        /// The payload field that was absent.
        field: String,
    },

    /// A component payload field had the wrong value type during decode.
    #[error("component {component}: field {field} is not a {expected}")]
    FieldType {
        /// The component kind being decoded.
        component: String,
        /// The payload field with the wrong type.
        field: String,
        /// Description of the expected value type.
        expected: String,
    },

    /// The persistence collaborator failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}
