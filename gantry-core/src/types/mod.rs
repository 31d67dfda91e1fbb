//! Core types for the vector index.
//!
//! - [`Embedding`] - A validated dense vector with dimension checks
//! - [`VectorId`] - Identifier assigned to a stored vector

mod embedding;
mod id;

pub use embedding::Embedding;
pub use id::VectorId;
