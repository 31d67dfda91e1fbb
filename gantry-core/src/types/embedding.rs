//! Embedding type for vector storage.

use std::ops::Deref;

use crate::error::GantryError;

/// A dense vector with value validation.
///
/// Embeddings are fixed-dimension vectors of f32 values stored as a
/// contiguous array. Construction rejects empty vectors and non-finite
/// components; dimensionality against a particular index is checked at
/// append/search time, not here.
///
/// # Example
///
/// ```
/// use gantry_core::types::Embedding;
///
/// let embedding = Embedding::new(vec![1.0, 2.0, 3.0]).unwrap();
/// assert_eq!(embedding.dimension(), 3);
/// assert_eq!(embedding.as_slice(), &[1.0, 2.0, 3.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    data: Vec<f32>,
}

impl Embedding {
    /// Create a new embedding from a vector of f32 values.
    ///
    /// # Errors
    ///
    /// Returns an error if the vector is empty or contains NaN/Infinite
    /// values.
    pub fn new(data: Vec<f32>) -> Result<Self, GantryError> {
        if data.is_empty() {
            return Err(GantryError::InvalidDimension { expected: 1, actual: 0 });
        }

        for (i, &value) in data.iter().enumerate() {
            if !value.is_finite() {
                return Err(GantryError::InvalidValue {
                    index: i,
                    value,
                    reason: if value.is_nan() {
                        "NaN values are not allowed"
                    } else {
                        "Infinite values are not allowed"
                    },
                });
            }
        }

        Ok(Self { data })
    }

    /// Create an embedding from a borrowed slice.
    ///
    /// # Errors
    ///
    /// Same validation as [`Embedding::new`].
    pub fn from_slice(data: &[f32]) -> Result<Self, GantryError> {
        Self::new(data.to_vec())
    }

    /// Get the dimension of the embedding.
    #[inline]
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Get the embedding data as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Consume the embedding and return the underlying vector.
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

impl Deref for Embedding {
    type Target = [f32];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl AsRef<[f32]> for Embedding {
    #[inline]
    fn as_ref(&self) -> &[f32] {
        &self.data
    }
}
