//! Index configuration.

use crate::distance::DistanceMetric;

/// Configuration options for opening a vector index.
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Distance metric used by searches against this index.
    pub metric: DistanceMetric,
}

impl IndexOptions {
    /// Create options with the default metric (Euclidean).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the distance metric used by searches.
    #[must_use]
    pub const fn metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metric_is_euclidean() {
        assert_eq!(IndexOptions::new().metric, DistanceMetric::Euclidean);
    }

    #[test]
    fn builder_overrides_metric() {
        let options = IndexOptions::new().metric(DistanceMetric::Cosine);
        assert_eq!(options.metric, DistanceMetric::Cosine);
    }
}
