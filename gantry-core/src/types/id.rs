//! Unique identifiers for stored vectors.

use std::fmt;

/// Unique identifier for a vector stored in an index.
///
/// Identifiers are assigned in strictly increasing order starting from 0
/// and are never reused for the lifetime of an index file, even across
/// close/reopen cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VectorId(u64);

impl VectorId {
    /// Create a new `VectorId` from a raw u64 value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for VectorId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for VectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_roundtrip() {
        let id = VectorId::new(42);
        assert_eq!(id.as_u64(), 42);
    }

    #[test]
    fn ids_are_ordered() {
        let a = VectorId::new(1);
        let b = VectorId::new(2);
        assert!(a < b);
    }

    #[test]
    fn display() {
        assert_eq!(VectorId::new(7).to_string(), "7");
    }
}
