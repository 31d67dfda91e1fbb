//! On-disk segment layout.
//!
//! A segment file is a header followed by fixed-width records, all
//! little-endian:
//!
//! ```text
//! header  (24 bytes): magic [u8; 8], version u32, dimensions u32, count u64
//! records (count ×):  id u64, then dimensions × f32
//! ```
//!
//! Fixed-width records keep the offset of any entry computable from its
//! position, which leaves random access and memory-mapping open without
//! a format change.

use crate::error::GantryError;
use crate::types::{Embedding, VectorId};

/// Magic bytes identifying a segment file.
pub const MAGIC: [u8; 8] = *b"GANTRYS\0";

/// Current segment format version.
pub const VERSION: u32 = 1;

/// Size of the segment header in bytes.
pub const HEADER_SIZE: usize = 24;

/// Upper bound on dimensionality accepted from a header.
///
/// Sanity check against corrupted headers; a garbage dimension would
/// otherwise drive the record size and allocation computations.
pub const MAX_DIMENSIONS: u32 = 65_536;

/// Parsed segment header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Dimensionality of every vector in the segment.
    pub dimensions: u32,
    /// Number of records following the header.
    pub count: u64,
}

impl Header {
    /// Create a header for a segment holding `count` vectors of
    /// `dimensions` components.
    #[must_use]
    pub const fn new(dimensions: u32, count: u64) -> Self {
        Self { dimensions, count }
    }

    /// Serialize the header to its on-disk form.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[..8].copy_from_slice(&MAGIC);
        bytes[8..12].copy_from_slice(&VERSION.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.dimensions.to_le_bytes());
        bytes[16..24].copy_from_slice(&self.count.to_le_bytes());
        bytes
    }

    /// Parse a header from its on-disk form.
    ///
    /// # Errors
    ///
    /// Returns [`GantryError::CorruptStore`] if the bytes are too short,
    /// carry the wrong magic, an unsupported version, or an implausible
    /// dimensionality.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GantryError> {
        if bytes.len() < HEADER_SIZE {
            return Err(GantryError::CorruptStore(format!(
                "header truncated: {} bytes, expected {HEADER_SIZE}",
                bytes.len()
            )));
        }

        let magic: [u8; 8] = bytes[..8].try_into().expect("slice length checked");
        if magic != MAGIC {
            return Err(GantryError::CorruptStore(format!("bad magic: {magic:?}")));
        }

        let version = u32::from_le_bytes(bytes[8..12].try_into().expect("slice length checked"));
        if version != VERSION {
            return Err(GantryError::CorruptStore(format!(
                "unsupported segment version: {version}, expected {VERSION}"
            )));
        }

        let dimensions =
            u32::from_le_bytes(bytes[12..16].try_into().expect("slice length checked"));
        if dimensions == 0 || dimensions > MAX_DIMENSIONS {
            return Err(GantryError::CorruptStore(format!(
                "implausible dimensionality in header: {dimensions}"
            )));
        }

        let count = u64::from_le_bytes(bytes[16..24].try_into().expect("slice length checked"));

        Ok(Self { dimensions, count })
    }
}

/// Byte size of one record at the given dimensionality.
#[must_use]
pub const fn record_size(dimensions: usize) -> usize {
    8 + dimensions * 4
}

/// Append one record to `out`.
pub fn encode_record(id: VectorId, vector: &[f32], out: &mut Vec<u8>) {
    out.extend_from_slice(&id.as_u64().to_le_bytes());
    for &value in vector {
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Parse one record of `dimensions` components.
///
/// # Errors
///
/// Returns [`GantryError::CorruptStore`] if the byte length is wrong or
/// the stored components are not finite (valid appends never persist
/// NaN/Inf, so their presence means the file was damaged).
pub fn decode_record(dimensions: usize, bytes: &[u8]) -> Result<(VectorId, Embedding), GantryError> {
    if bytes.len() != record_size(dimensions) {
        return Err(GantryError::CorruptStore(format!(
            "record truncated: {} bytes, expected {}",
            bytes.len(),
            record_size(dimensions)
        )));
    }

    let id = u64::from_le_bytes(bytes[..8].try_into().expect("slice length checked"));

    let mut data = Vec::with_capacity(dimensions);
    for chunk in bytes[8..].chunks_exact(4) {
        data.push(f32::from_le_bytes(chunk.try_into().expect("chunk length checked")));
    }

    let embedding = Embedding::new(data)
        .map_err(|e| GantryError::CorruptStore(format!("invalid vector data in record: {e}")))?;

    Ok((VectorId::new(id), embedding))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip() {
        let header = Header::new(128, 1000);
        let decoded = Header::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn header_bad_magic() {
        let mut bytes = Header::new(4, 0).to_bytes();
        bytes[0] = b'X';
        let err = Header::from_bytes(&bytes).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn header_unsupported_version() {
        let mut bytes = Header::new(4, 0).to_bytes();
        bytes[8..12].copy_from_slice(&99u32.to_le_bytes());
        let err = Header::from_bytes(&bytes).unwrap_err();
        assert!(err.is_corruption());
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn header_zero_dimensions() {
        let mut bytes = Header::new(4, 0).to_bytes();
        bytes[12..16].copy_from_slice(&0u32.to_le_bytes());
        assert!(Header::from_bytes(&bytes).unwrap_err().is_corruption());
    }

    #[test]
    fn header_implausible_dimensions() {
        let mut bytes = Header::new(4, 0).to_bytes();
        bytes[12..16].copy_from_slice(&(MAX_DIMENSIONS + 1).to_le_bytes());
        assert!(Header::from_bytes(&bytes).unwrap_err().is_corruption());
    }

    #[test]
    fn header_too_short() {
        assert!(Header::from_bytes(&[0u8; 10]).unwrap_err().is_corruption());
    }

    #[test]
    fn record_roundtrip() {
        let mut bytes = Vec::new();
        encode_record(VectorId::new(42), &[1.0, -2.5, 0.0, 3.25], &mut bytes);
        assert_eq!(bytes.len(), record_size(4));

        let (id, embedding) = decode_record(4, &bytes).unwrap();
        assert_eq!(id, VectorId::new(42));
        assert_eq!(embedding.as_slice(), &[1.0, -2.5, 0.0, 3.25]);
    }

    #[test]
    fn record_wrong_length() {
        let mut bytes = Vec::new();
        encode_record(VectorId::new(1), &[1.0, 2.0], &mut bytes);
        assert!(decode_record(3, &bytes).unwrap_err().is_corruption());
    }

    #[test]
    fn record_non_finite_is_corruption() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&7u64.to_le_bytes());
        bytes.extend_from_slice(&f32::NAN.to_le_bytes());
        assert!(decode_record(1, &bytes).unwrap_err().is_corruption());
    }
}
