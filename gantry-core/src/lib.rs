//! Gantry Core
//!
//! This crate provides a persistent, append-only index of fixed-dimension
//! vectors with exact nearest-neighbor search.
//!
//! # Overview
//!
//! The core engine provides:
//!
//! - **Append-only storage**: Vectors get strictly increasing identifiers that are never reused
//! - **Durable persistence**: The full index is flushed atomically through a temp file and rename
//! - **Exact search**: Brute-force k-NN with deterministic, identifier-stable tie-breaking
//! - **Distance functions**: Euclidean, cosine, and dot product metrics
//!
//! # Example
//!
//! ```no_run
//! use gantry_core::config::IndexOptions;
//! use gantry_core::index::VectorIndex;
//!
//! # fn main() -> gantry_core::Result<()> {
//! // Open (or create) an index of 128-dimensional vectors.
//! let mut index = VectorIndex::open("vectors.gantry", 128, IndexOptions::new())?;
//!
//! // Append vectors; each gets the next identifier.
//! let id = index.add(&vec![0.5; 128])?;
//!
//! // Persist everything appended so far.
//! index.flush()?;
//!
//! // Exact nearest-neighbor search.
//! let hits = index.search(&vec![0.5; 128], 10)?;
//! assert_eq!(hits[0].id, id);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`index`] - The [`VectorIndex`] façade tying storage and search together
//! - [`store`] - The in-memory vector log and identifier allocation
//! - [`segment`] - The on-disk segment format and atomic writer
//! - [`ops`] - Search operators ([`ExactKnn`])
//! - [`distance`] - Distance functions
//! - [`types`] - Core types ([`Embedding`], [`VectorId`])
//! - [`config`] - Index options
//! - [`error`] - Error types

pub mod config;
pub mod distance;
pub mod error;
pub mod index;
pub mod ops;
pub mod segment;
pub mod store;
pub mod types;

pub use config::IndexOptions;
pub use distance::DistanceMetric;
pub use error::{GantryError, Result};
pub use index::VectorIndex;
pub use ops::{ExactKnn, SearchResult};
pub use types::{Embedding, VectorId};
