//! Fixed-size `.map` payload header
//!
//! # Format
//! ```text
//! [size u32 = 32] [version u32 = 100] [width u32] [height u32] [reserved 16 bytes]
//! ```
//! All fields little-endian. `size` is the on-disk record size and is written
//! as 32 regardless of how this struct is laid out in memory.

use ascq_core::{AscqError, GridSize, Result};
use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};

/// Serialized header length in bytes
pub const HEADER_SIZE: usize = 32;

/// Format version written by the encoder
pub const FORMAT_VERSION: u32 = 100;

/// Length of the reserved tail
pub const RESERVED_LEN: usize = 16;

/// Header at the start of every decompressed `.map` payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NmpFileHeader {
    /// Declared header size (always 32 on write)
    pub size: u32,

    /// Format version (always 100 on write)
    pub version: u32,

    /// Grid width in cells
    pub width: u32,

    /// Grid height in cells
    pub height: u32,

    /// Reserved bytes, zeroed on write
    pub reserved: [u8; RESERVED_LEN],
}

impl NmpFileHeader {
    /// Create a header for a grid of the given size
    pub fn new(size: GridSize) -> Self {
        Self {
            size: HEADER_SIZE as u32,
            version: FORMAT_VERSION,
            width: size.width,
            height: size.height,
            reserved: [0; RESERVED_LEN],
        }
    }

    /// Grid dimensions declared by this header
    pub fn grid_size(&self) -> GridSize {
        GridSize::new(self.width, self.height)
    }

    /// Append the 32-byte header to `buf`
    pub fn write(&self, buf: &mut BytesMut) {
        buf.put_u32_le(HEADER_SIZE as u32);
        buf.put_u32_le(self.version);
        buf.put_u32_le(self.width);
        buf.put_u32_le(self.height);
        buf.put_slice(&self.reserved);
    }

    /// Parse the header from the start of a decompressed payload
    pub fn read(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(AscqError::InvalidHeader(format!(
                "payload is {} bytes, header needs {}",
                data.len(),
                HEADER_SIZE
            )));
        }

        let mut buf = &data[..HEADER_SIZE];
        let size = buf.get_u32_le();
        let version = buf.get_u32_le();
        let width = buf.get_u32_le();
        let height = buf.get_u32_le();
        let mut reserved = [0u8; RESERVED_LEN];
        buf.copy_to_slice(&mut reserved);

        if size != HEADER_SIZE as u32 {
            tracing::warn!("Header declares size {}, expected {}", size, HEADER_SIZE);
        }
        if version != FORMAT_VERSION {
            tracing::warn!("Header declares version {}, expected {}", version, FORMAT_VERSION);
        }

        Ok(Self {
            size,
            version,
            width,
            height,
            reserved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = NmpFileHeader::new(GridSize::new(0x0102, 7));
        let mut buf = BytesMut::new();
        header.write(&mut buf);

        assert_eq!(buf.len(), HEADER_SIZE);
        assert_eq!(&buf[0..4], &[32, 0, 0, 0]);
        assert_eq!(&buf[4..8], &[100, 0, 0, 0]);
        assert_eq!(&buf[8..12], &[0x02, 0x01, 0, 0]);
        assert_eq!(&buf[12..16], &[7, 0, 0, 0]);
        assert!(buf[16..32].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_size_always_written_as_32() {
        let mut header = NmpFileHeader::new(GridSize::new(1, 1));
        header.size = 999;
        let mut buf = BytesMut::new();
        header.write(&mut buf);
        assert_eq!(&buf[0..4], &[32, 0, 0, 0]);
    }

    #[test]
    fn test_read_header() {
        let header = NmpFileHeader::new(GridSize::new(40, 30));
        let mut buf = BytesMut::new();
        header.write(&mut buf);
        buf.put_u8(0xAA); // cell data follows

        let parsed = NmpFileHeader::read(&buf).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.grid_size(), GridSize::new(40, 30));
    }

    #[test]
    fn test_short_header() {
        let result = NmpFileHeader::read(&[0u8; 31]);
        assert!(matches!(result, Err(AscqError::InvalidHeader(_))));
    }
}
