//! Sample components for tests and examples.
//!
//! These are deliberately small: an integer wrapper, a string wrapper, and a
//! payload-less tag. They exist so unit tests, workspace integration tests,
//! and doc examples can share concrete component types without each defining
//! their own.

use nocturne_foundation::{Error, Payload, Result, Value};

use crate::component::{ComponentKind, ComponentType};

/// Integer-valued sample component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Health {
    current: i64,
}

impl Health {
    /// Creates a health component with the given current value.
    #[must_use]
    pub fn new(current: i64) -> Self {
        Self { current }
    }

    /// Returns the current value.
    #[must_use]
    pub fn current(&self) -> i64 {
        self.current
    }
}

impl ComponentType for Health {
    const KIND: ComponentKind = ComponentKind::new("Health");

    fn encode(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("current".into(), Value::Int(self.current));
        payload
    }

    fn decode(payload: &Payload) -> Result<Self> {
        let current = payload
            .get("current")
            .ok_or_else(|| Error::missing_field("Health", "current"))?
            .as_int()
            .ok_or_else(|| Error::field_type("Health", "current", "integer"))?;
        Ok(Self { current })
    }
}

/// String-valued sample component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Name {
    text: String,
}

impl Name {
    /// Creates a name component.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the name text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl ComponentType for Name {
    const KIND: ComponentKind = ComponentKind::new("Name");

    fn encode(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("text".into(), Value::from(self.text.as_str()));
        payload
    }

    fn decode(payload: &Payload) -> Result<Self> {
        let text = payload
            .get("text")
            .ok_or_else(|| Error::missing_field("Name", "text"))?
            .as_str()
            .ok_or_else(|| Error::field_type("Name", "text", "string"))?;
        Ok(Self::new(text))
    }
}

/// Payload-less tag component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Marker;

impl ComponentType for Marker {
    const KIND: ComponentKind = ComponentKind::new("Marker");

    fn encode(&self) -> Payload {
        Payload::new()
    }

    fn decode(_payload: &Payload) -> Result<Self> {
        Ok(Self)
    }
}
