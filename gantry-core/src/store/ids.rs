//! Identifier allocation for stored vectors.

use crate::types::VectorId;

/// Allocator for vector identifiers.
///
/// Issues strictly increasing identifiers starting from 0. Allocation
/// never fails and never blocks. When an index is reconstructed from a
/// segment file, the allocator must resume above the highest identifier
/// found on disk; restarting from the origin would silently reuse
/// identifiers for new entries.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Create an allocator for a fresh index, starting at identifier 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Create an allocator that resumes after `max_id`.
    ///
    /// Used when reconstructing an index from persisted state; the next
    /// identifier issued is `max_id + 1`.
    #[must_use]
    pub const fn resuming_after(max_id: VectorId) -> Self {
        Self { next: max_id.as_u64() + 1 }
    }

    /// Allocate the next identifier.
    pub fn next(&mut self) -> VectorId {
        let id = VectorId::new(self.next);
        self.next += 1;
        id
    }

    /// The identifier the next call to [`IdAllocator::next`] will return.
    #[must_use]
    pub const fn peek(&self) -> VectorId {
        VectorId::new(self.next)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.next(), VectorId::new(0));
        assert_eq!(alloc.next(), VectorId::new(1));
        assert_eq!(alloc.next(), VectorId::new(2));
    }

    #[test]
    fn strictly_increasing() {
        let mut alloc = IdAllocator::new();
        let ids: Vec<_> = (0..100).map(|_| alloc.next()).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn resumes_above_max() {
        let mut alloc = IdAllocator::resuming_after(VectorId::new(41));
        assert_eq!(alloc.next(), VectorId::new(42));
    }

    #[test]
    fn peek_does_not_advance() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.peek(), VectorId::new(0));
        assert_eq!(alloc.peek(), VectorId::new(0));
        assert_eq!(alloc.next(), VectorId::new(0));
        assert_eq!(alloc.peek(), VectorId::new(1));
    }
}
