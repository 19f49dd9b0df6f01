//! Tile layers
//!
//! A layer is a dense `width * height` grid of cells stored in row-major
//! order. Each cell optionally references a tile of one of the map's
//! tilesets.

use ascq_core::{GridPos, GridSize};
use serde::{Deserialize, Serialize};

/// Reference to a tile: tileset position in the map plus tile ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRef {
    pub tileset: usize,
    pub tile: u32,
}

impl TileRef {
    #[inline]
    pub const fn new(tileset: usize, tile: u32) -> Self {
        Self { tileset, tile }
    }
}

/// A grid position's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cell {
    pub tile: Option<TileRef>,
}

impl Cell {
    /// The empty cell
    pub const EMPTY: Cell = Cell { tile: None };

    #[inline]
    pub const fn new(tile: TileRef) -> Self {
        Self { tile: Some(tile) }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.tile.is_none()
    }
}

/// A named grid of cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayer {
    /// Display name; its prefix decides the layer's role
    pub name: String,

    /// Grid dimensions
    pub size: GridSize,

    /// Cells in row-major order
    cells: Vec<Cell>,
}

impl TileLayer {
    /// Create an empty layer
    pub fn new(name: impl Into<String>, size: GridSize) -> Self {
        Self {
            name: name.into(),
            size,
            cells: vec![Cell::EMPTY; size.cell_count()],
        }
    }

    /// Get the cell at a position
    ///
    /// Positions outside the grid read as empty.
    #[inline]
    pub fn cell_at(&self, pos: GridPos) -> Cell {
        self.size
            .index_of(pos)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(Cell::EMPTY)
    }

    /// Set the cell at a position
    ///
    /// Returns `false` (and changes nothing) when the position is outside
    /// the grid.
    #[inline]
    pub fn set_cell(&mut self, pos: GridPos, cell: Cell) -> bool {
        match self.size.index_of(pos).and_then(|index| self.cells.get_mut(index)) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Raw cell data
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate `(position, cell)` pairs of non-empty cells in row-major order
    pub fn occupied(&self) -> impl Iterator<Item = (GridPos, TileRef)> + '_ {
        self.size
            .positions()
            .zip(self.cells.iter())
            .filter_map(|(pos, cell)| cell.tile.map(|tile| (pos, tile)))
    }

    /// Number of non-empty cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    /// True when the cell storage matches the declared size
    pub fn is_consistent(&self) -> bool {
        self.cells.len() == self.size.cell_count()
    }
}
