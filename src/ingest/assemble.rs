//! Byte Assembly
//!
//! Joins vector parts in caller order and decodes little-endian `f32`.

use bytes::{Bytes, BytesMut};

use crate::error::{LoadError, Result};

/// Width of one vector component in bytes
pub const FLOAT_WIDTH: usize = std::mem::size_of::<f32>();

/// Concatenate parts in order
///
/// Fails unless the combined length is a multiple of [`FLOAT_WIDTH`].
/// Individual parts may end mid-float.
pub fn concat_parts(parts: Vec<Bytes>) -> Result<Bytes> {
    let total: usize = parts.iter().map(Bytes::len).sum();
    if total % FLOAT_WIDTH != 0 {
        return Err(LoadError::Alignment {
            total_bytes: total as u64,
        });
    }

    // A lone part is used as-is.
    if parts.len() == 1 {
        return Ok(parts.into_iter().next().unwrap_or_default());
    }

    let mut merged = BytesMut::with_capacity(total);
    for part in &parts {
        merged.extend_from_slice(part);
    }
    Ok(merged.freeze())
}

/// Decode an aligned buffer into floats
pub fn decode_f32_le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(FLOAT_WIDTH)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(floats: &[f32]) -> Vec<u8> {
        floats.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    #[test]
    fn test_concat_preserves_order() {
        let bytes = encode(&[1.0, -2.5, 3.25]);
        let parts = vec![
            Bytes::copy_from_slice(&bytes[..5]),
            Bytes::copy_from_slice(&bytes[5..6]),
            Bytes::copy_from_slice(&bytes[6..]),
        ];

        let merged = concat_parts(parts).unwrap();
        assert_eq!(merged.as_ref(), bytes.as_slice());
        assert_eq!(decode_f32_le(&merged), vec![1.0, -2.5, 3.25]);
    }

    #[test]
    fn test_concat_misaligned_total() {
        let parts = vec![Bytes::from(vec![0u8; 8]), Bytes::from(vec![0u8; 5])];
        let err = concat_parts(parts).unwrap_err();
        assert!(matches!(err, LoadError::Alignment { total_bytes: 13 }));
    }

    #[test]
    fn test_concat_empty() {
        assert!(concat_parts(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_single_part_is_not_copied() {
        let part = Bytes::from(encode(&[1.0, 2.0]));
        let ptr = part.as_ptr();
        let merged = concat_parts(vec![part]).unwrap();
        assert_eq!(merged.as_ptr(), ptr);
    }

    #[test]
    fn test_decode_little_endian() {
        assert_eq!(decode_f32_le(&[0x00, 0x00, 0x80, 0x3f]), vec![1.0]);
    }
}
