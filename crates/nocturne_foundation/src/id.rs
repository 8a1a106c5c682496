//! Opaque entity identifiers.

use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Opaque 128-bit entity identifier.
///
/// Ids are minted randomly; uniqueness is assumed by construction, not
/// enforced. The numeric value carries no meaning beyond identity, and the
/// ordering is only used to give iteration a stable order.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EntityId(u128);

impl EntityId {
    /// Creates an entity id from a raw 128-bit value.
    #[must_use]
    pub const fn from_u128(raw: u128) -> Self {
        Self(raw)
    }

    /// Returns the raw 128-bit value.
    #[must_use]
    pub const fn as_u128(self) -> u128 {
        self.0
    }

    /// Mints a fresh random id.
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random::<u128>())
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({:032x})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

// Serialized as a (hi, lo) pair of u64s: msgpack has no native 128-bit
// integers.
impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let hi = (self.0 >> 64) as u64;
        let lo = self.0 as u64;
        (hi, lo).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (hi, lo) = <(u64, u64)>::deserialize(deserializer)?;
        Ok(Self((u128::from(hi) << 64) | u128::from(lo)))
    }
}
