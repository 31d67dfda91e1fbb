//! Append-only in-memory vector log.

use crate::error::GantryError;
use crate::store::IdAllocator;
use crate::types::{Embedding, VectorId};

/// A stored (identifier, vector) pair.
///
/// Entries are immutable after creation; the log never reorders or
/// deduplicates them.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The identifier assigned at append time.
    pub id: VectorId,
    /// The vector data.
    pub embedding: Embedding,
}

/// In-memory store of vector entries, retained in insertion order.
///
/// The log is the source of truth for an open index: searches run over
/// it directly, so unflushed entries are always visible. Identifiers are
/// strictly increasing, which keeps the entry sequence sorted by id and
/// makes id lookup a binary search.
#[derive(Debug)]
pub struct VectorLog {
    dimensions: usize,
    entries: Vec<Entry>,
    allocator: IdAllocator,
    dirty: bool,
}

impl VectorLog {
    /// Create an empty log for a fresh index.
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, entries: Vec::new(), allocator: IdAllocator::new(), dirty: false }
    }

    /// Reconstruct a log from entries loaded off disk.
    ///
    /// The identifier allocator resumes above the highest loaded id, so
    /// appends after a reopen can never collide with persisted entries.
    /// Loaded entries are considered clean (already durable).
    #[must_use]
    pub fn from_entries(dimensions: usize, entries: Vec<Entry>) -> Self {
        debug_assert!(
            entries.windows(2).all(|w| w[0].id < w[1].id),
            "loaded entries must be sorted by strictly increasing id"
        );
        let allocator = match entries.last() {
            Some(entry) => IdAllocator::resuming_after(entry.id),
            None => IdAllocator::new(),
        };
        Self { dimensions, entries, allocator, dirty: false }
    }

    /// Append a vector, allocating its identifier.
    ///
    /// On any failure the log is left unchanged: validation happens
    /// before the identifier is allocated and before the entry is
    /// stored.
    ///
    /// # Errors
    ///
    /// - [`GantryError::DimensionMismatch`] if the vector length does not
    ///   match the log dimensionality.
    /// - [`GantryError::Allocation`] if the backing storage cannot grow.
    pub fn append(&mut self, embedding: Embedding) -> Result<VectorId, GantryError> {
        if embedding.dimension() != self.dimensions {
            return Err(GantryError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.dimension(),
            });
        }

        self.entries.try_reserve(1).map_err(|_| GantryError::Allocation)?;

        let id = self.allocator.next();
        self.entries.push(Entry { id, embedding });
        self.dirty = true;
        Ok(id)
    }

    /// Look up a vector by identifier.
    #[must_use]
    pub fn get(&self, id: VectorId) -> Option<&Embedding> {
        // Entries are sorted by id (strictly increasing allocation).
        self.entries
            .binary_search_by_key(&id, |entry| entry.id)
            .ok()
            .map(|pos| &self.entries[pos].embedding)
    }

    /// Number of entries currently held, flushed or not.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The fixed dimensionality every entry satisfies.
    #[inline]
    #[must_use]
    pub const fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Whether entries have been appended since the last flush.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark all current entries durable. Called after a successful flush.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// All entries in insertion (= id) order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterate over (id, vector) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (VectorId, &[f32])> {
        self.entries.iter().map(|entry| (entry.id, entry.embedding.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedding(values: &[f32]) -> Embedding {
        Embedding::from_slice(values).unwrap()
    }

    #[test]
    fn append_assigns_sequential_ids() {
        let mut log = VectorLog::new(2);
        assert_eq!(log.append(embedding(&[1.0, 0.0])).unwrap(), VectorId::new(0));
        assert_eq!(log.append(embedding(&[0.0, 1.0])).unwrap(), VectorId::new(1));
        assert_eq!(log.len(), 2);
        assert!(log.is_dirty());
    }

    #[test]
    fn append_dimension_mismatch_leaves_log_unchanged() {
        let mut log = VectorLog::new(3);
        log.append(embedding(&[1.0, 2.0, 3.0])).unwrap();

        let result = log.append(embedding(&[1.0, 2.0]));
        assert!(matches!(result, Err(GantryError::DimensionMismatch { expected: 3, actual: 2 })));
        assert_eq!(log.len(), 1);

        // The failed append must not have consumed an identifier.
        assert_eq!(log.append(embedding(&[4.0, 5.0, 6.0])).unwrap(), VectorId::new(1));
    }

    #[test]
    fn get_by_id() {
        let mut log = VectorLog::new(2);
        let a = log.append(embedding(&[1.0, 0.0])).unwrap();
        let b = log.append(embedding(&[0.0, 1.0])).unwrap();

        assert_eq!(log.get(a).unwrap().as_slice(), &[1.0, 0.0]);
        assert_eq!(log.get(b).unwrap().as_slice(), &[0.0, 1.0]);
        assert!(log.get(VectorId::new(99)).is_none());
    }

    #[test]
    fn from_entries_resumes_allocator() {
        let entries = vec![
            Entry { id: VectorId::new(0), embedding: embedding(&[1.0]) },
            Entry { id: VectorId::new(7), embedding: embedding(&[2.0]) },
        ];
        let mut log = VectorLog::from_entries(1, entries);

        assert_eq!(log.len(), 2);
        assert!(!log.is_dirty());
        assert_eq!(log.append(embedding(&[3.0])).unwrap(), VectorId::new(8));
    }

    #[test]
    fn from_entries_empty() {
        let mut log = VectorLog::from_entries(4, Vec::new());
        assert!(log.is_empty());
        assert_eq!(log.append(embedding(&[0.0; 4])).unwrap(), VectorId::new(0));
    }

    #[test]
    fn mark_clean_clears_dirty() {
        let mut log = VectorLog::new(1);
        log.append(embedding(&[1.0])).unwrap();
        assert!(log.is_dirty());
        log.mark_clean();
        assert!(!log.is_dirty());
    }

    #[test]
    fn iter_preserves_insertion_order() {
        let mut log = VectorLog::new(1);
        for i in 0..5 {
            log.append(embedding(&[i as f32])).unwrap();
        }
        let ids: Vec<u64> = log.iter().map(|(id, _)| id.as_u64()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }
}
