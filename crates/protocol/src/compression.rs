//! Compression adapter for map payloads
//!
//! The container only needs "compress these bytes" and "inflate back to
//! exactly N bytes", so the concrete library sits behind [`Compressor`].

use ascq_core::{AscqError, Result};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Default zlib compression level
pub const DEFAULT_LEVEL: u32 = 6;

/// Whole-buffer compressor used by the `ZLIB` container
pub trait Compressor {
    /// Compress an entire buffer
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress a buffer that must inflate to exactly `expected_len` bytes
    fn decompress(&self, data: &[u8], expected_len: usize) -> Result<Vec<u8>>;
}

/// Deflate with zlib framing, backed by `flate2`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZlibCompressor {
    level: u32,
}

impl ZlibCompressor {
    /// Create a compressor with the given level (clamped to 0..=9)
    pub fn new(level: u32) -> Self {
        Self { level: level.min(9) }
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for ZlibCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

impl Compressor for ZlibCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(self.level));
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn decompress(&self, data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        // Read one byte past the expected length so oversized streams are caught
        let limit = expected_len as u64 + 1;
        let mut decoder = ZlibDecoder::new(data).take(limit);
        // The declared length is untrusted; grow with the data actually inflated
        let mut decompressed = Vec::with_capacity(expected_len.min(data.len().saturating_mul(4)));
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| AscqError::Decompression(e.to_string()))?;

        if decompressed.len() != expected_len {
            return Err(AscqError::Decompression(format!(
                "expected {} bytes, inflated {}{}",
                expected_len,
                decompressed.len().min(expected_len),
                if decompressed.len() > expected_len { "+" } else { "" }
            )));
        }

        Ok(decompressed)
    }
}
