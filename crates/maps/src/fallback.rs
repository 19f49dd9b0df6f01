//! Built-in fallback tileset
//!
//! When a decoded map has no block layer of its own, blocked cells are
//! painted with a wall tile from this tileset so they stay visible in the
//! editor. The art is a 64x224 PNG holding seven 64x32 tiles.

use crate::document::MapDocument;
use crate::error::{MapError, Result};
use crate::tiles::{Tileset, TilesetImage};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// Embedded tileset image
pub const FALLBACK_PNG: &[u8] = include_bytes!("../assets/metro.png");

/// Tile width of the fallback tileset
pub const FALLBACK_TILE_WIDTH: u32 = 64;

/// Tile height of the fallback tileset
pub const FALLBACK_TILE_HEIGHT: u32 = 32;

/// Read width and height of an encoded PNG
pub fn png_dimensions(data: &[u8]) -> Result<(u32, u32)> {
    ImageReader::with_format(Cursor::new(data), ImageFormat::Png)
        .into_dimensions()
        .map_err(|e| MapError::Document(format!("fallback image: {}", e)))
}

/// Build the fallback tileset under the given name
pub fn fallback_tileset(name: &str) -> Result<Tileset> {
    let (width, height) = png_dimensions(FALLBACK_PNG)?;
    let image = TilesetImage {
        width,
        height,
        data: FALLBACK_PNG.to_vec(),
    };
    Ok(Tileset::from_image(name, FALLBACK_TILE_WIDTH, FALLBACK_TILE_HEIGHT, image))
}

/// Position of the fallback tileset in `doc`, adding it when no tileset has that name
pub fn ensure_fallback_tileset(doc: &mut MapDocument, name: &str) -> Result<usize> {
    if let Some(index) = doc.tileset_index(name) {
        return Ok(index);
    }

    tracing::debug!("Adding fallback tileset {:?}", name);
    Ok(doc.add_tileset(fallback_tileset(name)?))
}
