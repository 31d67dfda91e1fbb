//! The vector index façade.
//!
//! [`VectorIndex`] ties the in-memory vector log, the on-disk segment
//! format, and the search operators together behind one handle. A handle
//! owns an exclusive advisory lock on its segment for its whole lifetime,
//! so two handles can never write the same file.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, info, warn};

use crate::config::IndexOptions;
use crate::distance::DistanceMetric;
use crate::error::{GantryError, Result};
use crate::ops::{ExactKnn, SearchResult};
use crate::segment::{self, format};
use crate::store::VectorLog;
use crate::types::{Embedding, VectorId};

/// A persistent, append-only index of fixed-dimension vectors.
///
/// All mutation happens in memory; [`VectorIndex::flush`] persists the
/// full contents atomically. Dropping the handle releases the file lock
/// but does NOT flush: unflushed vectors are lost.
///
/// # Example
///
/// ```no_run
/// use gantry_core::config::IndexOptions;
/// use gantry_core::index::VectorIndex;
///
/// # fn main() -> gantry_core::Result<()> {
/// let mut index = VectorIndex::open("vectors.gantry", 3, IndexOptions::new())?;
/// let id = index.add(&[0.1, 0.2, 0.3])?;
/// index.flush()?;
/// let hits = index.search(&[0.1, 0.2, 0.3], 5)?;
/// assert_eq!(hits[0].id, id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct VectorIndex {
    path: PathBuf,
    lock_path: PathBuf,
    lock_file: File,
    log: VectorLog,
    metric: DistanceMetric,
}

impl VectorIndex {
    /// Open an index at `path` with the given dimensionality.
    ///
    /// If the segment file exists it is loaded and fully validated; if it
    /// does not, the index starts empty and the file is created on the
    /// first flush. An exclusive advisory lock is taken on a `.lock`
    /// sidecar next to the segment and held until the handle is dropped.
    ///
    /// # Errors
    ///
    /// - [`GantryError::InvalidDimension`] if `dimensions` is zero or
    ///   above [`format::MAX_DIMENSIONS`].
    /// - [`GantryError::Locked`] if another handle holds the lock.
    /// - [`GantryError::DimensionMismatch`] if an existing segment was
    ///   written with a different dimensionality.
    /// - [`GantryError::CorruptStore`] if the segment file cannot be
    ///   parsed.
    pub fn open(
        path: impl Into<PathBuf>,
        dimensions: usize,
        options: IndexOptions,
    ) -> Result<Self> {
        let path = path.into();

        if dimensions == 0 || dimensions > format::MAX_DIMENSIONS as usize {
            return Err(GantryError::InvalidDimension { expected: 1, actual: dimensions });
        }

        let lock_path = segment::sibling_path(&path, "lock");
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        if let Err(err) = lock_file.try_lock_exclusive() {
            return Err(if err.kind() == io::ErrorKind::WouldBlock {
                GantryError::Locked
            } else {
                GantryError::Io(err)
            });
        }

        let log = match Self::load_log(&path, dimensions) {
            Ok(log) => log,
            Err(err) => {
                // Don't leave a stale lock behind a failed open.
                let _ = FileExt::unlock(&lock_file);
                let _ = fs::remove_file(&lock_path);
                return Err(err);
            }
        };

        info!(
            path = %path.display(),
            dimensions,
            vectors = log.len(),
            "opened vector index"
        );

        Ok(Self { path, lock_path, lock_file, log, metric: options.metric })
    }

    fn load_log(path: &Path, dimensions: usize) -> Result<VectorLog> {
        match segment::read(path, dimensions)? {
            Some(loaded) => Ok(VectorLog::from_entries(dimensions, loaded.entries)),
            None => {
                debug!(path = %path.display(), "no segment file, starting empty");
                Ok(VectorLog::new(dimensions))
            }
        }
    }

    /// Append a vector and return its newly assigned identifier.
    ///
    /// Identifiers are strictly increasing from 0 across the index's
    /// whole history, including across reopen. A failed append consumes
    /// no identifier.
    ///
    /// # Errors
    ///
    /// - [`GantryError::DimensionMismatch`] if `vector` has the wrong
    ///   length.
    /// - [`GantryError::InvalidValue`] if `vector` contains NaN or
    ///   Infinity.
    /// - [`GantryError::Allocation`] if the log cannot grow.
    pub fn add(&mut self, vector: &[f32]) -> Result<VectorId> {
        if vector.len() != self.log.dimensions() {
            return Err(GantryError::DimensionMismatch {
                expected: self.log.dimensions(),
                actual: vector.len(),
            });
        }
        let embedding = Embedding::from_slice(vector)?;
        self.log.append(embedding)
    }

    /// Look up a vector by identifier.
    #[must_use]
    pub fn get(&self, id: VectorId) -> Option<&[f32]> {
        self.log.get(id).map(Embedding::as_slice)
    }

    /// Persist the full index contents to disk atomically.
    ///
    /// The segment is rewritten through a temp file and renamed into
    /// place, so a crash mid-flush leaves the previous segment intact.
    /// A no-op when nothing changed since the last flush or open.
    pub fn flush(&mut self) -> Result<()> {
        if !self.log.is_dirty() {
            debug!(path = %self.path.display(), "flush skipped, index is clean");
            return Ok(());
        }

        segment::write(&self.path, self.log.dimensions(), self.log.entries())?;
        self.log.mark_clean();
        info!(
            path = %self.path.display(),
            vectors = self.log.len(),
            "flushed vector index"
        );
        Ok(())
    }

    /// Find the `k` nearest stored vectors to `query`.
    ///
    /// Results come back sorted by ascending distance, exact ties broken
    /// by ascending identifier. Fewer than `k` stored vectors (including
    /// none) yields that many results; this is not an error.
    ///
    /// # Errors
    ///
    /// - [`GantryError::DimensionMismatch`] if `query` has the wrong
    ///   length.
    /// - [`GantryError::InvalidValue`] if `query` contains NaN or
    ///   Infinity.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.log.dimensions() {
            return Err(GantryError::DimensionMismatch {
                expected: self.log.dimensions(),
                actual: query.len(),
            });
        }
        for (index, &value) in query.iter().enumerate() {
            if !value.is_finite() {
                return Err(GantryError::InvalidValue {
                    index,
                    value,
                    reason: if value.is_nan() {
                        "NaN values are not allowed"
                    } else {
                        "Infinite values are not allowed"
                    },
                });
            }
        }

        Ok(ExactKnn::new(self.log.iter(), query, self.metric, k).into_results())
    }

    /// Number of vectors currently in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.len()
    }

    /// Whether the index contains no vectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// The fixed dimensionality of this index.
    #[must_use]
    pub const fn dimensions(&self) -> usize {
        self.log.dimensions()
    }

    /// Whether there are appends not yet persisted by a flush.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.log.is_dirty()
    }

    /// The distance metric this index searches with.
    #[must_use]
    pub const fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// The segment file path this index persists to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for VectorIndex {
    fn drop(&mut self) {
        if self.log.is_dirty() {
            warn!(
                path = %self.path.display(),
                "index dropped with unflushed vectors, they are lost"
            );
        }
        let _ = FileExt::unlock(&self.lock_file);
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn segment_path(dir: &TempDir) -> PathBuf {
        dir.path().join("vectors.gantry")
    }

    #[test]
    fn open_rejects_zero_dimensions() {
        let dir = TempDir::new().unwrap();
        let err = VectorIndex::open(segment_path(&dir), 0, IndexOptions::new()).unwrap_err();
        assert!(matches!(err, GantryError::InvalidDimension { actual: 0, .. }));
    }

    #[test]
    fn open_rejects_oversized_dimensions() {
        let dir = TempDir::new().unwrap();
        let dims = format::MAX_DIMENSIONS as usize + 1;
        let err = VectorIndex::open(segment_path(&dir), dims, IndexOptions::new()).unwrap_err();
        assert!(matches!(err, GantryError::InvalidDimension { .. }));
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let index = VectorIndex::open(segment_path(&dir), 3, IndexOptions::new()).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.dimensions(), 3);
        assert!(!index.is_dirty());
    }

    #[test]
    fn add_assigns_increasing_ids_from_zero() {
        let dir = TempDir::new().unwrap();
        let mut index = VectorIndex::open(segment_path(&dir), 2, IndexOptions::new()).unwrap();
        assert_eq!(index.add(&[1.0, 2.0]).unwrap(), VectorId::new(0));
        assert_eq!(index.add(&[3.0, 4.0]).unwrap(), VectorId::new(1));
        assert_eq!(index.len(), 2);
        assert!(index.is_dirty());
    }

    #[test]
    fn add_rejects_wrong_dimension_without_consuming_id() {
        let dir = TempDir::new().unwrap();
        let mut index = VectorIndex::open(segment_path(&dir), 2, IndexOptions::new()).unwrap();
        index.add(&[1.0, 2.0]).unwrap();
        assert!(matches!(
            index.add(&[1.0]).unwrap_err(),
            GantryError::DimensionMismatch { expected: 2, actual: 1 }
        ));
        assert_eq!(index.add(&[5.0, 6.0]).unwrap(), VectorId::new(1));
    }

    #[test]
    fn add_rejects_non_finite_values() {
        let dir = TempDir::new().unwrap();
        let mut index = VectorIndex::open(segment_path(&dir), 2, IndexOptions::new()).unwrap();
        assert!(matches!(
            index.add(&[1.0, f32::NAN]).unwrap_err(),
            GantryError::InvalidValue { index: 1, .. }
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn get_returns_stored_vector() {
        let dir = TempDir::new().unwrap();
        let mut index = VectorIndex::open(segment_path(&dir), 2, IndexOptions::new()).unwrap();
        let id = index.add(&[0.5, -0.5]).unwrap();
        assert_eq!(index.get(id), Some(&[0.5, -0.5][..]));
        assert_eq!(index.get(VectorId::new(99)), None);
    }

    #[test]
    fn flush_on_clean_index_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let path = segment_path(&dir);
        let mut index = VectorIndex::open(&path, 2, IndexOptions::new()).unwrap();
        index.flush().unwrap();
        // Nothing was appended, so no file appears.
        assert!(!path.exists());
    }

    #[test]
    fn flush_then_reopen_restores_contents_and_ids() {
        let dir = TempDir::new().unwrap();
        let path = segment_path(&dir);

        {
            let mut index = VectorIndex::open(&path, 2, IndexOptions::new()).unwrap();
            index.add(&[1.0, 2.0]).unwrap();
            index.add(&[3.0, 4.0]).unwrap();
            index.flush().unwrap();
            assert!(!index.is_dirty());
        }

        let mut index = VectorIndex::open(&path, 2, IndexOptions::new()).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(VectorId::new(0)), Some(&[1.0, 2.0][..]));
        assert_eq!(index.get(VectorId::new(1)), Some(&[3.0, 4.0][..]));
        // Allocation resumes above the highest persisted id.
        assert_eq!(index.add(&[5.0, 6.0]).unwrap(), VectorId::new(2));
    }

    #[test]
    fn drop_without_flush_loses_appends() {
        let dir = TempDir::new().unwrap();
        let path = segment_path(&dir);

        {
            let mut index = VectorIndex::open(&path, 2, IndexOptions::new()).unwrap();
            index.add(&[1.0, 2.0]).unwrap();
            index.flush().unwrap();
            index.add(&[3.0, 4.0]).unwrap();
            // No flush; second vector must not survive.
        }

        let index = VectorIndex::open(&path, 2, IndexOptions::new()).unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn reopen_with_different_dimension_fails() {
        let dir = TempDir::new().unwrap();
        let path = segment_path(&dir);

        {
            let mut index = VectorIndex::open(&path, 3, IndexOptions::new()).unwrap();
            index.add(&[1.0, 2.0, 3.0]).unwrap();
            index.flush().unwrap();
        }

        let err = VectorIndex::open(&path, 4, IndexOptions::new()).unwrap_err();
        assert!(matches!(err, GantryError::DimensionMismatch { expected: 4, actual: 3 }));
    }

    #[test]
    fn second_open_is_locked() {
        let dir = TempDir::new().unwrap();
        let path = segment_path(&dir);

        let _first = VectorIndex::open(&path, 2, IndexOptions::new()).unwrap();
        let err = VectorIndex::open(&path, 2, IndexOptions::new()).unwrap_err();
        assert!(matches!(err, GantryError::Locked));
    }

    #[test]
    fn lock_released_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = segment_path(&dir);

        drop(VectorIndex::open(&path, 2, IndexOptions::new()).unwrap());
        let _second = VectorIndex::open(&path, 2, IndexOptions::new()).unwrap();
    }

    #[test]
    fn search_empty_index_returns_no_results() {
        let dir = TempDir::new().unwrap();
        let index = VectorIndex::open(segment_path(&dir), 2, IndexOptions::new()).unwrap();
        assert!(index.search(&[0.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn search_returns_min_of_k_and_len() {
        let dir = TempDir::new().unwrap();
        let mut index = VectorIndex::open(segment_path(&dir), 1, IndexOptions::new()).unwrap();
        for i in 0..4 {
            index.add(&[i as f32]).unwrap();
        }
        assert_eq!(index.search(&[0.0], 2).unwrap().len(), 2);
        assert_eq!(index.search(&[0.0], 10).unwrap().len(), 4);
        assert!(index.search(&[0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn search_orders_by_distance_then_id() {
        let dir = TempDir::new().unwrap();
        let mut index = VectorIndex::open(segment_path(&dir), 1, IndexOptions::new()).unwrap();
        index.add(&[5.0]).unwrap(); // id 0
        index.add(&[-5.0]).unwrap(); // id 1, same distance from 0
        index.add(&[1.0]).unwrap(); // id 2

        let hits = index.search(&[0.0], 3).unwrap();
        let ids: Vec<u64> = hits.iter().map(|r| r.id.as_u64()).collect();
        assert_eq!(ids, vec![2, 0, 1]);
    }

    #[test]
    fn search_rejects_invalid_query() {
        let dir = TempDir::new().unwrap();
        let mut index = VectorIndex::open(segment_path(&dir), 2, IndexOptions::new()).unwrap();
        index.add(&[1.0, 2.0]).unwrap();

        assert!(matches!(
            index.search(&[1.0], 1).unwrap_err(),
            GantryError::DimensionMismatch { expected: 2, actual: 1 }
        ));
        assert!(matches!(
            index.search(&[1.0, f32::INFINITY], 1).unwrap_err(),
            GantryError::InvalidValue { index: 1, .. }
        ));
    }

    #[test]
    fn cosine_metric_is_used_when_configured() {
        let dir = TempDir::new().unwrap();
        let options = IndexOptions::new().metric(DistanceMetric::Cosine);
        let mut index = VectorIndex::open(segment_path(&dir), 2, options).unwrap();
        index.add(&[0.0, 3.0]).unwrap(); // id 0, orthogonal to query
        index.add(&[5.0, 0.0]).unwrap(); // id 1, same direction as query

        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].id, VectorId::new(1));
        assert!(hits[0].distance < 1e-6);
    }
}
