//! `ZLIB` file container
//!
//! # Format
//! ```text
//! [magic "ZLIB"] [uncompressed_len u32 LE] [zlib stream ...]
//! ```

use crate::compression::Compressor;
use ascq_core::{AscqError, Result};
use bytes::{Buf, BufMut, BytesMut};

/// File magic
pub const MAGIC: &[u8; 4] = b"ZLIB";

/// Bytes before the compressed stream
pub const PREFIX_LEN: usize = 8;

/// Check whether a buffer starts with the container magic
pub fn has_magic(data: &[u8]) -> bool {
    data.len() >= MAGIC.len() && &data[..MAGIC.len()] == MAGIC
}

/// Compress a payload and wrap it in the container
pub fn pack<C: Compressor + ?Sized>(payload: &[u8], compressor: &C) -> Result<Vec<u8>> {
    let uncompressed_len = u32::try_from(payload.len())
        .map_err(|_| AscqError::InvalidData(format!("payload of {} bytes exceeds u32", payload.len())))?;
    let compressed = compressor.compress(payload)?;

    let mut buf = BytesMut::with_capacity(PREFIX_LEN + compressed.len());
    buf.put_slice(MAGIC);
    buf.put_u32_le(uncompressed_len);
    buf.put_slice(&compressed);
    Ok(buf.to_vec())
}

/// Validate the container prefix and inflate the payload
pub fn unpack<C: Compressor + ?Sized>(data: &[u8], compressor: &C) -> Result<Vec<u8>> {
    if !has_magic(data) {
        let found = data[..data.len().min(MAGIC.len())].to_vec();
        return Err(AscqError::BadMagic(found));
    }

    if data.len() < PREFIX_LEN {
        return Err(AscqError::Truncated {
            offset: MAGIC.len(),
            needed: 4,
            available: data.len() - MAGIC.len(),
        });
    }

    let mut length = &data[MAGIC.len()..PREFIX_LEN];
    let uncompressed_len = length.get_u32_le() as usize;

    compressor.decompress(&data[PREFIX_LEN..], uncompressed_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::ZlibCompressor;

    #[test]
    fn test_pack_layout() {
        let payload = vec![1u8; 50];
        let packed = pack(&payload, &ZlibCompressor::default()).unwrap();

        assert_eq!(&packed[0..4], b"ZLIB");
        assert_eq!(&packed[4..8], &[50, 0, 0, 0]);
        assert_eq!(unpack(&packed, &ZlibCompressor::default()).unwrap(), payload);
    }

    #[test]
    fn test_bad_magic() {
        let result = unpack(b"GZIP\x01\x00\x00\x00", &ZlibCompressor::default());
        assert!(matches!(result, Err(AscqError::BadMagic(m)) if m == b"GZIP"));

        let result = unpack(b"ZL", &ZlibCompressor::default());
        assert!(matches!(result, Err(AscqError::BadMagic(_))));
    }

    #[test]
    fn test_missing_length() {
        let result = unpack(b"ZLIB\x01", &ZlibCompressor::default());
        assert!(matches!(result, Err(AscqError::Truncated { .. })));
    }

    #[test]
    fn test_length_mismatch() {
        let mut packed = pack(&[9u8; 20], &ZlibCompressor::default()).unwrap();
        packed[4] = 21;
        let result = unpack(&packed, &ZlibCompressor::default());
        assert!(matches!(result, Err(AscqError::Decompression(_))));

        packed[4..8].copy_from_slice(&u32::MAX.to_le_bytes());
        let result = unpack(&packed, &ZlibCompressor::default());
        assert!(matches!(result, Err(AscqError::Decompression(_))));
    }

    #[test]
    fn test_has_magic() {
        assert!(has_magic(b"ZLIBxxxx"));
        assert!(has_magic(b"ZLIB"));
        assert!(!has_magic(b"ZLI"));
        assert!(!has_magic(b"zlib"));
    }
}
