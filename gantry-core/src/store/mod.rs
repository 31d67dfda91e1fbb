//! In-memory vector storage.
//!
//! The [`VectorLog`] is the source of truth for an open index: every
//! appended entry lives here until (and after) it is flushed to the
//! segment file. The [`IdAllocator`] hands out the strictly increasing
//! identifiers the log stores entries under.

mod ids;
mod log;

pub use ids::IdAllocator;
pub use log::{Entry, VectorLog};
