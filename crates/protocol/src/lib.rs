//! # Ascq Protocol Library
//!
//! Byte-level implementation of the `.map` binary format.
//!
//! ## File Layout
//!
//! ```text
//! offset 0   : "ZLIB"
//! offset 4   : uncompressed length (u32 LE)
//! offset 8.. : zlib stream, inflating to:
//!     [0..32)  NmpFileHeader { size=32, version=100, width, height, reserved[16] }
//!     [32..)   width*height cell records, row-major
//! ```
//!
//! ## Modules
//!
//! - [`header`]: the 32-byte payload header
//! - [`flags`]: the per-cell flag byte
//! - [`records`]: cell record writer and the [`CellReader`] walker
//! - [`compression`]: the [`Compressor`] adapter and its zlib backend
//! - [`container`]: the `ZLIB` magic and length prefix

pub mod compression;
pub mod container;
pub mod flags;
pub mod header;
pub mod records;

// Re-export commonly used items
pub use compression::{Compressor, ZlibCompressor};
pub use container::{has_magic, pack, unpack, MAGIC};
pub use flags::CellFlags;
pub use header::{NmpFileHeader, FORMAT_VERSION, HEADER_SIZE};
pub use records::{CellReader, CellRecord, FloorRecord, ObjectRecord};
