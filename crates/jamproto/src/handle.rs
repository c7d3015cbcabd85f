//! Object identity: stable ids and volatile indices.
//!
//! The host hands out two coordinates for every object. The `id` is stable
//! for the object's lifetime and is the only thing safe to remember. The
//! `index` is a position in a mutable collection and is renumbered whenever
//! anything is created or deleted elsewhere in the set, so it must be
//! re-resolved before every use.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a host-side object.
///
/// The host reports id `0` for phantom slots (objects that appear in a
/// collection listing but no longer exist, or not yet). Those are never
/// valid targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl ObjectId {
    /// The phantom sentinel.
    pub const INVALID: ObjectId = ObjectId(0);

    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(raw: u64) -> Self {
        ObjectId(raw)
    }
}

/// Reference to a host object at a point in time.
///
/// `index` is only meaningful relative to the snapshot it was captured in;
/// `id` uniquely identifies the object for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handle {
    pub id: ObjectId,
    pub index: usize,
    pub name: String,
}

impl Handle {
    pub fn new(id: ObjectId, index: usize, name: impl Into<String>) -> Self {
        Self {
            id,
            index,
            name: name.into(),
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (id {}, index {})", self.name, self.id, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_sentinel() {
        assert!(!ObjectId::INVALID.is_valid());
        assert!(ObjectId(1).is_valid());
        assert_eq!(ObjectId::INVALID, ObjectId(0));
    }

    #[test]
    fn display_includes_identity() {
        let h = Handle::new(ObjectId(17), 3, "AI Drums");
        assert_eq!(h.to_string(), "'AI Drums' (id 17, index 3)");
    }
}
