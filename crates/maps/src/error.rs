//! Error types for the maps crate

use ascq_core::AscqError;
use std::path::PathBuf;

/// Map codec error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// No layer name starts with the object marker
    #[error("No object layer found")]
    MissingObjectLayer,

    /// No layer name starts with the floor marker
    #[error("No floor layer found")]
    MissingFloorLayer,

    /// The companion document was not supplied or does not exist
    #[error("Companion map missing: {0} (the .map file must sit next to its companion document)")]
    CompanionMapMissing(String),

    /// The companion document exists but could not be loaded
    #[error("Companion map unreadable: {path}: {message}")]
    CompanionMapUnreadable { path: PathBuf, message: String },

    /// The file does not start with "ZLIB"
    #[error("Bad magic: expected \"ZLIB\", found {0:?}")]
    BadMagic(Vec<u8>),

    /// The payload did not inflate to its declared length
    #[error("Decompression error: {0}")]
    DecompressionError(String),

    /// File I/O error
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed decompressed payload
    #[error("Invalid map format: {0}")]
    Format(String),

    /// Structurally invalid map document
    #[error("Invalid map document: {0}")]
    Document(String),
}

impl From<AscqError> for MapError {
    fn from(err: AscqError) -> Self {
        match err {
            AscqError::Io(e) => MapError::Io(e),
            AscqError::BadMagic(found) => MapError::BadMagic(found),
            AscqError::Decompression(message) => MapError::DecompressionError(message),
            other => MapError::Format(other.to_string()),
        }
    }
}

/// Result type for map operations
pub type Result<T> = std::result::Result<T, MapError>;
