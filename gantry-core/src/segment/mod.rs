//! Segment file persistence.
//!
//! A segment is the durable representation of a vector log: one file,
//! rewritten whole on each flush. Writes go to a sibling temporary file
//! that is fsynced and then renamed over the target, so a crash mid-flush
//! never leaves a torn file at the index path; the previous segment
//! simply survives.

pub mod format;


use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{GantryError, Result};
use crate::store::Entry;
use crate::types::VectorId;

use format::{record_size, Header, HEADER_SIZE};

/// Outcome of reading a segment file.
#[derive(Debug)]
pub struct Segment {
    /// Entries in stored (= id) order.
    pub entries: Vec<Entry>,
}

/// Read the segment at `path`.
///
/// Returns `Ok(None)` if no file exists; an index opens empty in that
/// case, which is not an error.
///
/// # Errors
///
/// - [`GantryError::DimensionMismatch`] if the stored dimensionality
///   differs from `dimensions`; the index must not open.
/// - [`GantryError::CorruptStore`] if the file cannot be parsed: bad
///   magic or version, truncated records, trailing bytes after the last
///   record, or identifiers out of order.
/// - [`GantryError::Io`] for underlying read failures.
pub fn read(path: &Path, dimensions: usize) -> Result<Option<Segment>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);

    let mut header_bytes = [0u8; HEADER_SIZE];
    if let Err(e) = reader.read_exact(&mut header_bytes) {
        if e.kind() == ErrorKind::UnexpectedEof {
            warn!(path = %path.display(), "segment file too small for header");
            return Err(GantryError::CorruptStore("file too small for header".into()));
        }
        return Err(e.into());
    }
    let header = Header::from_bytes(&header_bytes)?;

    if header.dimensions as usize != dimensions {
        return Err(GantryError::DimensionMismatch {
            expected: dimensions,
            actual: header.dimensions as usize,
        });
    }

    // A record count must be validated against the actual file size
    // before it drives any allocation; a damaged count field is
    // corruption, not an out-of-memory condition. An exact match also
    // rules out truncation and trailing bytes up front.
    let expected_len = header
        .count
        .checked_mul(record_size(dimensions) as u64)
        .and_then(|records| records.checked_add(HEADER_SIZE as u64));
    if expected_len != Some(file_len) {
        warn!(
            path = %path.display(),
            count = header.count,
            file_len,
            "segment size does not match header count"
        );
        return Err(GantryError::CorruptStore(format!(
            "file size {file_len} does not match header count {}",
            header.count
        )));
    }

    let count = usize::try_from(header.count)
        .map_err(|_| GantryError::CorruptStore(format!("implausible count: {}", header.count)))?;

    let mut entries = Vec::new();
    entries.try_reserve_exact(count).map_err(|_| GantryError::Allocation)?;

    let mut record = vec![0u8; record_size(dimensions)];
    let mut last_id: Option<VectorId> = None;

    for position in 0..count {
        if let Err(e) = reader.read_exact(&mut record) {
            if e.kind() == ErrorKind::UnexpectedEof {
                warn!(
                    path = %path.display(),
                    position,
                    count,
                    "segment truncated mid-record"
                );
                return Err(GantryError::CorruptStore(format!(
                    "truncated at record {position} of {count}"
                )));
            }
            return Err(e.into());
        }

        let (id, embedding) = format::decode_record(dimensions, &record)?;

        // Identifiers are assigned strictly increasing, so any other
        // ordering on disk means the file was damaged or rewritten by
        // something that is not this engine.
        if last_id.is_some_and(|last| id <= last) {
            return Err(GantryError::CorruptStore(format!(
                "identifier {id} at record {position} not strictly increasing"
            )));
        }
        last_id = Some(id);

        entries.push(Entry { id, embedding });
    }

    debug!(path = %path.display(), count, "segment read");
    Ok(Some(Segment { entries }))
}

/// Write `entries` as the segment at `path`, atomically.
///
/// The segment is written to `<path>.tmp` in the same directory, synced,
/// and renamed over `path`. On failure the previous segment (if any) is
/// untouched and the temporary file is removed on a best-effort basis;
/// the caller's in-memory state is never consumed, so a retry is safe.
///
/// # Errors
///
/// Returns [`GantryError::Io`] if the temporary file cannot be created,
/// written, synced, or renamed.
pub fn write(path: &Path, dimensions: usize, entries: &[Entry]) -> Result<()> {
    let tmp_path = sibling_path(path, "tmp");

    let result = write_to_temp(&tmp_path, dimensions, entries)
        .and_then(|()| fs::rename(&tmp_path, path).map_err(GantryError::from));

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    } else {
        debug!(path = %path.display(), count = entries.len(), "segment written");
    }

    result
}

fn write_to_temp(tmp_path: &Path, dimensions: usize, entries: &[Entry]) -> Result<()> {
    let file = OpenOptions::new().write(true).create(true).truncate(true).open(tmp_path)?;
    let mut writer = BufWriter::new(file);

    let header = Header::new(dimensions as u32, entries.len() as u64);
    writer.write_all(&header.to_bytes())?;

    let mut record = Vec::with_capacity(record_size(dimensions));
    for entry in entries {
        record.clear();
        format::encode_record(entry.id, entry.embedding.as_slice(), &mut record);
        writer.write_all(&record)?;
    }

    writer.flush()?;
    // Durability before the rename makes the new segment visible.
    writer.get_ref().sync_all()?;
    Ok(())
}

/// Build a sibling path by appending `.{suffix}` to the full file name.
///
/// `Path::with_extension` would replace the existing extension, letting
/// two different index files collide on the same sibling.
pub(crate) fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
