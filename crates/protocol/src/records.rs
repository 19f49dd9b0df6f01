//! Variable-length cell records
//!
//! # Format
//! ```text
//! [flags u8]
//! if TILE:   [image u32] [pack_index u32]
//! if OBJECT: [image u32] [pack_index u32] [base u32]
//! ```
//! `image` is the zero-based art index (`imageIndex - 1`). All integers
//! little-endian. The record length is fully determined by the flag byte, so
//! readers must branch on it exactly as the writer did.

use crate::flags::CellFlags;
use crate::header::HEADER_SIZE;
use ascq_core::{AscqError, Result};
use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};

/// Floor field group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorRecord {
    pub image: u32,
    pub pack_index: u32,
}

/// Object field group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub image: u32,
    pub pack_index: u32,
    pub base: u32,
}

/// One decoded cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellRecord {
    pub block: bool,
    pub floor: Option<FloorRecord>,
    pub object: Option<ObjectRecord>,
}

impl CellRecord {
    /// Flag byte describing this record
    pub fn flags(&self) -> CellFlags {
        let mut flags = CellFlags::empty();
        flags.set(CellFlags::BLOCK, self.block);
        flags.set(CellFlags::TILE, self.floor.is_some());
        flags.set(CellFlags::OBJECT, self.object.is_some());
        flags
    }

    /// Encoded length in bytes
    pub fn encoded_len(&self) -> usize {
        self.flags().record_len()
    }

    /// Append this record to `buf`
    pub fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.flags().bits());

        if let Some(floor) = self.floor {
            buf.put_u32_le(floor.image);
            buf.put_u32_le(floor.pack_index);
        }

        if let Some(object) = self.object {
            buf.put_u32_le(object.image);
            buf.put_u32_le(object.pack_index);
            buf.put_u32_le(object.base);
        }
    }
}

/// Sequential reader over the cell records of a decompressed payload
///
/// Starts right after the header. [`CellReader::next_flags`] is the
/// structural walk (fields are skipped), [`CellReader::next_record`] parses
/// them. Both consume exactly [`CellFlags::record_len`] bytes per cell.
pub struct CellReader<'a> {
    data: &'a [u8],
    offset: usize,
    index: usize,
    cells: usize,
}

impl<'a> CellReader<'a> {
    /// Create a reader over a full payload (header included) holding `cells` records
    pub fn new(payload: &'a [u8], cells: usize) -> Self {
        Self {
            data: payload,
            offset: HEADER_SIZE.min(payload.len()),
            index: 0,
            cells,
        }
    }

    /// Byte offset of the next record within the payload
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Index of the next cell
    pub fn index(&self) -> usize {
        self.index
    }

    /// Read a flag byte and check that its whole record is present
    fn take_flags(&mut self) -> Result<Option<CellFlags>> {
        if self.index >= self.cells {
            return Ok(None);
        }

        let available = self.data.len() - self.offset;
        if available < 1 {
            return Err(AscqError::Truncated {
                offset: self.offset,
                needed: 1,
                available,
            });
        }

        let flags = CellFlags::from_bits_retain(self.data[self.offset]);
        let reserved = flags.reserved();
        if !reserved.is_empty() {
            tracing::debug!(
                "Cell {} sets reserved flag bits {:#04x}; ignored",
                self.index,
                reserved.bits()
            );
        }

        let needed = flags.record_len();
        if available < needed {
            return Err(AscqError::Truncated {
                offset: self.offset,
                needed,
                available,
            });
        }

        Ok(Some(flags))
    }

    /// Read the next flag byte and skip over its fields
    pub fn next_flags(&mut self) -> Result<Option<CellFlags>> {
        let Some(flags) = self.take_flags()? else {
            return Ok(None);
        };
        self.offset += flags.record_len();
        self.index += 1;
        Ok(Some(flags))
    }

    /// Read and parse the next record
    pub fn next_record(&mut self) -> Result<Option<CellRecord>> {
        let Some(flags) = self.take_flags()? else {
            return Ok(None);
        };

        let len = flags.record_len();
        let mut buf = &self.data[self.offset + 1..self.offset + len];

        let floor = flags.contains(CellFlags::TILE).then(|| FloorRecord {
            image: buf.get_u32_le(),
            pack_index: buf.get_u32_le(),
        });
        let object = flags.contains(CellFlags::OBJECT).then(|| ObjectRecord {
            image: buf.get_u32_le(),
            pack_index: buf.get_u32_le(),
            base: buf.get_u32_le(),
        });

        self.offset += len;
        self.index += 1;

        Ok(Some(CellRecord {
            block: flags.contains(CellFlags::BLOCK),
            floor,
            object,
        }))
    }

    /// Verify that every cell was read and no bytes remain
    pub fn finish(self) -> Result<()> {
        if self.index < self.cells {
            return Err(AscqError::InvalidData(format!(
                "read {} of {} cells",
                self.index, self.cells
            )));
        }

        let trailing = self.data.len() - self.offset;
        if trailing != 0 {
            return Err(AscqError::InvalidData(format!(
                "{} trailing bytes after {} cells",
                trailing, self.cells
            )));
        }

        Ok(())
    }
}

impl Iterator for CellReader<'_> {
    type Item = Result<CellRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                // Stop after the first error; later offsets are meaningless
                self.index = self.cells;
                Some(Err(e))
            }
        }
    }
}
