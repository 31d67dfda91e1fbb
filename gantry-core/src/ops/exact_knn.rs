//! Exact k-nearest-neighbor operator.
//!
//! Brute-force scan: compute the distance from the query to every stored
//! vector and keep the k smallest in a bounded max-heap. O(n·d) distance
//! work plus O(n·log k) heap maintenance, without sorting the full entry
//! set.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::distance::DistanceMetric;
use crate::types::VectorId;

use super::SearchResult;

/// Exact k-NN search over an iterator of stored vectors.
///
/// The scan runs in the constructor; the resulting matches are then
/// available sorted by ascending distance (ties by ascending id) through
/// the iterator or slice accessors.
///
/// # Example
///
/// ```
/// use gantry_core::distance::DistanceMetric;
/// use gantry_core::ops::ExactKnn;
/// use gantry_core::types::VectorId;
///
/// let stored = [
///     (VectorId::new(0), &[0.0_f32, 0.0][..]),
///     (VectorId::new(1), &[3.0, 4.0][..]),
/// ];
/// let knn = ExactKnn::new(stored, &[0.0, 0.0], DistanceMetric::Euclidean, 1);
/// assert_eq!(knn.as_slice()[0].id, VectorId::new(0));
/// ```
#[derive(Debug)]
pub struct ExactKnn {
    results: Vec<SearchResult>,
    position: usize,
}

/// Heap entry ordered so the worst candidate (largest distance, then
/// largest id) sits on top of the max-heap and is evicted first.
#[derive(Debug)]
struct Candidate {
    id: VectorId,
    distance: f32,
}

impl Candidate {
    fn key_cmp(&self, other: &Self) -> Ordering {
        // Stored vectors and queries are validated finite, so NaN cannot
        // arise from the metrics here; treat it as equal if it ever does.
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
            .then(self.id.cmp(&other.id))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.key_cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key_cmp(other)
    }
}

impl ExactKnn {
    /// Scan `vectors` and select the `k` nearest to `query`.
    ///
    /// Every vector is assumed to share the query's dimensionality; the
    /// index façade validates that before constructing the operator.
    /// Fewer than `k` stored vectors yields that many results; an empty
    /// input yields none. `k == 0` is allowed and yields none.
    pub fn new<'a, I>(vectors: I, query: &[f32], metric: DistanceMetric, k: usize) -> Self
    where
        I: IntoIterator<Item = (VectorId, &'a [f32])>,
    {
        if k == 0 {
            return Self { results: Vec::new(), position: 0 };
        }

        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k.min(1024) + 1);

        for (id, vector) in vectors {
            debug_assert_eq!(vector.len(), query.len(), "dimensionality validated by caller");
            let candidate = Candidate { id, distance: metric.calculate(query, vector) };

            if heap.len() < k {
                heap.push(candidate);
            } else if let Some(worst) = heap.peek() {
                if candidate.key_cmp(worst) == Ordering::Less {
                    heap.pop();
                    heap.push(candidate);
                }
            }
        }

        let mut results: Vec<SearchResult> =
            heap.into_iter().map(|c| SearchResult::new(c.id, c.distance)).collect();
        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });

        Self { results, position: 0 }
    }

    /// Number of matches found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether no matches were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// All matches as a slice, best first.
    #[must_use]
    pub fn as_slice(&self) -> &[SearchResult] {
        &self.results
    }

    /// Consume the operator, returning all matches best-first.
    #[must_use]
    pub fn into_results(self) -> Vec<SearchResult> {
        self.results
    }
}

impl Iterator for ExactKnn {
    type Item = SearchResult;

    fn next(&mut self) -> Option<SearchResult> {
        let result = self.results.get(self.position).copied();
        if result.is_some() {
            self.position += 1;
        }
        result
    }
}
