//! Ascq Core - shared error type and grid geometry

mod error;
mod positions;

pub use error::*;
pub use positions::*;
