//! Grid geometry shared by the document model and the binary format

use serde::{Deserialize, Serialize};

/// Dimensions of a map grid, in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of cells
    pub const fn cell_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check whether a signed position falls inside the grid
    pub fn contains(self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as i64) < self.width as i64 && (pos.y as i64) < self.height as i64
    }

    /// Row-major index of a position, or `None` when outside the grid
    pub fn index_of(self, pos: GridPos) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Iterate every position in row-major order (x fastest)
    pub fn positions(self) -> impl Iterator<Item = GridPos> {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |y| (0..width).map(move |x| GridPos::new(x, y)))
    }
}

/// Cell position on a grid
///
/// Signed so that reprojected rows (which may land above the map) can be
/// represented before bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
