//! Distance functions for vector similarity.
//!
//! All metrics are expressed as distances: smaller means closer. Dot
//! product is negated so maximum similarity becomes minimum distance,
//! letting the ranking engine treat every metric uniformly.

mod scalar;

pub use scalar::{
    cosine_distance, cosine_similarity, dot_product, euclidean_distance,
    euclidean_distance_squared, l2_norm,
};

/// Distance metric for comparing vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    /// Euclidean (L2) distance.
    #[default]
    Euclidean,
    /// Cosine distance (1 - cosine similarity).
    Cosine,
    /// Dot product (negated, for max similarity).
    DotProduct,
}

impl DistanceMetric {
    /// Calculate the distance between two vectors using this metric.
    #[inline]
    #[must_use]
    pub fn calculate(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Euclidean => euclidean_distance(a, b),
            Self::Cosine => cosine_distance(a, b),
            Self::DotProduct => -dot_product(a, b),
        }
    }
}
