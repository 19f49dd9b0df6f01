//! Per-cell flag byte
//!
//! Each cell record starts with one flag byte selecting which field groups
//! follow it. Only `TILE` and `OBJECT` carry fields; every other bit is
//! informational and adds nothing to the record length.

use bitflags::bitflags;

bitflags! {
    /// Bit set for the per-cell flag byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellFlags: u8 {
        /// Cell is impassable
        const BLOCK = 1;
        /// Reserved, never written
        const SMALLTILE = 2;
        /// Floor fields follow (8 bytes)
        const TILE = 4;
        /// Object fields follow (12 bytes)
        const OBJECT = 8;
        /// Reserved, never written
        const UNKNOWN = 16;
    }
}

impl CellFlags {
    /// Bytes following the flag byte when `TILE` is set
    pub const TILE_FIELDS_LEN: usize = 2 * 4;
    /// Bytes following the flag byte when `OBJECT` is set
    pub const OBJECT_FIELDS_LEN: usize = 3 * 4;

    /// Bits the encoder may emit
    pub const WRITABLE: CellFlags = CellFlags::BLOCK.union(CellFlags::TILE).union(CellFlags::OBJECT);

    /// Bits outside [`CellFlags::WRITABLE`], named or not
    pub fn reserved(self) -> CellFlags {
        CellFlags::from_bits_retain(self.bits() & !Self::WRITABLE.bits())
    }

    /// Full record length including the flag byte
    pub fn record_len(self) -> usize {
        let mut len = 1;
        if self.contains(Self::TILE) {
            len += Self::TILE_FIELDS_LEN;
        }
        if self.contains(Self::OBJECT) {
            len += Self::OBJECT_FIELDS_LEN;
        }
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_values() {
        assert_eq!(CellFlags::BLOCK.bits(), 1);
        assert_eq!(CellFlags::SMALLTILE.bits(), 2);
        assert_eq!(CellFlags::TILE.bits(), 4);
        assert_eq!(CellFlags::OBJECT.bits(), 8);
        assert_eq!(CellFlags::UNKNOWN.bits(), 16);
    }

    #[test]
    fn test_record_len() {
        assert_eq!(CellFlags::empty().record_len(), 1);
        assert_eq!(CellFlags::BLOCK.record_len(), 1);
        assert_eq!(CellFlags::TILE.record_len(), 9);
        assert_eq!(CellFlags::OBJECT.record_len(), 13);
        assert_eq!((CellFlags::TILE | CellFlags::OBJECT | CellFlags::BLOCK).record_len(), 21);
    }

    #[test]
    fn test_reserved_bits_add_no_length() {
        let flags = CellFlags::from_bits_retain(0xE0) | CellFlags::SMALLTILE | CellFlags::UNKNOWN | CellFlags::TILE;
        assert_eq!(flags.record_len(), 9);
        assert_eq!(flags.reserved().bits(), 0xF2);
        assert!(CellFlags::WRITABLE.reserved().is_empty());
    }

    #[test]
    fn test_set_and_contains() {
        let mut flags = CellFlags::empty();
        flags.set(CellFlags::TILE, true);
        flags.insert(CellFlags::BLOCK);
        assert!(flags.contains(CellFlags::TILE));
        assert!(flags.contains(CellFlags::BLOCK));
        assert!(!flags.contains(CellFlags::OBJECT));

        flags.set(CellFlags::TILE, false);
        assert_eq!(flags, CellFlags::BLOCK);
    }
}
