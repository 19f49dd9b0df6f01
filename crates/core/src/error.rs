//! Core error types for the binary map format

#[derive(thiserror::Error, Debug)]
pub enum AscqError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bad magic: expected \"ZLIB\", found {0:?}")]
    BadMagic(Vec<u8>),

    #[error("Decompression error: {0}")]
    Decompression(String),

    #[error("Truncated payload: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AscqError>;
