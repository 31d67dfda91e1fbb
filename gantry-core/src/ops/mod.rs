//! Vector search operators.
//!
//! Search over an index is expressed as an operator that consumes the
//! stored entries and yields ranked [`SearchResult`]s. [`ExactKnn`] is
//! the only operator today: a brute-force scan with streaming top-k
//! selection, which is the right design at the entry counts this engine
//! targets. An approximate operator (graph- or tree-based) can slot in
//! behind the same result contract without touching callers.

mod exact_knn;

pub use exact_knn::ExactKnn;

use crate::types::VectorId;

/// A single ranked match from a search.
///
/// Results are ordered by ascending distance; exact distance ties break
/// by ascending identifier so rankings are deterministic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    /// The identifier of the matching vector.
    pub id: VectorId,
    /// The distance to the query vector (lower is closer).
    pub distance: f32,
}

impl SearchResult {
    /// Create a new search result.
    #[must_use]
    pub const fn new(id: VectorId, distance: f32) -> Self {
        Self { id, distance }
    }
}
