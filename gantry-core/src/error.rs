//! Error types for the vector index engine.

use std::io;

use thiserror::Error;

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, GantryError>;

/// Errors that can occur in index operations.
#[derive(Debug, Error)]
pub enum GantryError {
    /// Vector length does not match the index dimensionality.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The expected dimension.
        expected: usize,
        /// The actual dimension.
        actual: usize,
    },

    /// Dimensionality outside the supported range (zero, or above the
    /// segment format's sanity bound).
    #[error("invalid dimension: {actual} is outside the supported range")]
    InvalidDimension {
        /// The minimum supported dimension.
        expected: usize,
        /// The actual dimension.
        actual: usize,
    },

    /// Invalid value in a vector (NaN, Infinity).
    #[error("invalid value at index {index}: {value} - {reason}")]
    InvalidValue {
        /// The index of the invalid value.
        index: usize,
        /// The invalid value.
        value: f32,
        /// The reason the value is invalid.
        reason: &'static str,
    },

    /// The segment file exists but cannot be parsed.
    ///
    /// A corrupt file is never silently treated as empty; data loss must
    /// be surfaced to the caller.
    #[error("corrupt segment: {0}")]
    CorruptStore(String),

    /// I/O error while reading or writing the segment file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The vector log could not grow to hold a new entry.
    #[error("allocation failed: vector log cannot grow")]
    Allocation,

    /// The segment file is already owned by another index handle.
    #[error("segment is locked by another index handle or process")]
    Locked,

    /// Operation invoked on a closed or never-opened handle.
    ///
    /// The core engine cannot reach this state through safe Rust; it is
    /// reported by the foreign-function boundary when a caller passes a
    /// NULL or freed handle.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

impl GantryError {
    /// Returns true if this error indicates on-disk data corruption.
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(self, Self::CorruptStore(_))
    }
}
