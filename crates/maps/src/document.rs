//! Editor-agnostic map document
//!
//! The document is what the companion store loads and saves, and what the
//! codec consumes on encode and augments on decode.

use crate::error::{MapError, Result};
use crate::layer::{TileLayer, TileRef};
use crate::tiles::{Tile, Tileset};
use ascq_core::GridSize;
use serde::{Deserialize, Serialize};

/// A tile map: grid size, ordered layers and tilesets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDocument {
    /// Grid dimensions, shared by every layer
    pub size: GridSize,

    /// Layers, bottom to top
    #[serde(default)]
    pub layers: Vec<TileLayer>,

    /// Tilesets referenced by [`TileRef::tileset`]
    #[serde(default)]
    pub tilesets: Vec<Tileset>,
}

impl MapDocument {
    /// Create an empty map
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            layers: Vec::new(),
            tilesets: Vec::new(),
        }
    }

    /// Append a tileset and return its position
    pub fn add_tileset(&mut self, tileset: Tileset) -> usize {
        self.tilesets.push(tileset);
        self.tilesets.len() - 1
    }

    /// Append a layer
    pub fn add_layer(&mut self, layer: TileLayer) {
        self.layers.push(layer);
    }

    /// Create an empty layer with the map's size and return it for filling
    pub fn push_layer(&mut self, name: impl Into<String>) -> &mut TileLayer {
        self.layers.push(TileLayer::new(name, self.size));
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }

    /// Find a layer by exact name
    pub fn layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Position of the first tileset with the given name
    pub fn tileset_index(&self, name: &str) -> Option<usize> {
        self.tilesets.iter().position(|tileset| tileset.name == name)
    }

    pub fn tileset(&self, index: usize) -> Option<&Tileset> {
        self.tilesets.get(index)
    }

    /// Resolve a tile reference
    pub fn tile(&self, tile: TileRef) -> Option<&Tile> {
        self.tilesets.get(tile.tileset)?.tile(tile.tile)
    }

    /// Check structural consistency
    ///
    /// Every layer must match the map size and every cell must resolve to
    /// an existing tile.
    pub fn validate(&self) -> Result<()> {
        if self.size.width == 0 || self.size.height == 0 {
            return Err(MapError::Document(format!(
                "map size {}x{} is empty",
                self.size.width, self.size.height
            )));
        }

        for layer in &self.layers {
            if layer.size != self.size || !layer.is_consistent() {
                return Err(MapError::Document(format!(
                    "layer {:?} is {}x{} with {} cells, map is {}x{}",
                    layer.name,
                    layer.size.width,
                    layer.size.height,
                    layer.cells().len(),
                    self.size.width,
                    self.size.height
                )));
            }

            if let Some((pos, tile)) = layer.occupied().find(|(_, tile)| self.tile(*tile).is_none()) {
                return Err(MapError::Document(format!(
                    "layer {:?} cell ({}, {}) references missing tile {} of tileset {}",
                    layer.name, pos.x, pos.y, tile.tile, tile.tileset
                )));
            }
        }

        Ok(())
    }
}
