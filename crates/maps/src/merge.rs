//! Object layer merging
//!
//! The binary format stores a single object per cell, but maps are authored
//! with several stacked object layers. Each object tile is drawn at some row
//! while logically standing on the row its `base` anchor points to, so every
//! tile is reprojected onto its anchor row:
//!
//! ```text
//! base_y = y - (image_height - base) / row_height
//! ```
//!
//! and placed into the merged layer at the first free candidate row, in
//! priority order `base_y`, `base_y - 1`, `base_y + 1`. A tile moved up one
//! row has its base rewritten so the anchor still points at the drawn row; a
//! tile moved down keeps its base. A tile with no free candidate is dropped.
//!
//! Candidate rows outside the grid are never free.

use crate::document::MapDocument;
use crate::layer::{TileLayer, TileRef};
use ascq_core::{GridPos, GridSize};

/// A cell of the merged object plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedCell {
    /// Source tile
    pub tile: TileRef,

    /// Anchor offset written for this cell, possibly rewritten
    pub base: i32,
}

/// Where a tile ended up relative to its anchor row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Placed on `base_y`
    Anchor,
    /// Placed on `base_y - 1` with a rewritten base
    Above,
    /// Placed on `base_y + 1`, base unchanged
    Below,
    /// No free candidate row
    Dropped,
}

/// Counters describing one merge run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub anchored: usize,
    pub moved_up: usize,
    pub moved_down: usize,
    pub dropped: usize,
    /// Tiles without a `base` property
    pub skipped: usize,
}

impl MergeStats {
    /// Number of tiles present in the merged layer
    pub fn placed(&self) -> usize {
        self.anchored + self.moved_up + self.moved_down
    }

    fn record(&mut self, placement: Placement) {
        match placement {
            Placement::Anchor => self.anchored += 1,
            Placement::Above => self.moved_up += 1,
            Placement::Below => self.moved_down += 1,
            Placement::Dropped => self.dropped += 1,
        }
    }
}

/// Transient single object plane built during encode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedLayer {
    size: GridSize,
    cells: Vec<Option<MergedCell>>,
    stats: MergeStats,
}

impl MergedLayer {
    /// Create an empty merged layer
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![None; size.cell_count()],
            stats: MergeStats::default(),
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn stats(&self) -> MergeStats {
        self.stats
    }

    /// Get the merged cell at a position
    #[inline]
    pub fn get(&self, pos: GridPos) -> Option<MergedCell> {
        self.size.index_of(pos).and_then(|index| self.cells[index])
    }

    /// True when the position is inside the grid and empty
    #[inline]
    pub fn is_free(&self, pos: GridPos) -> bool {
        self.size
            .index_of(pos)
            .is_some_and(|index| self.cells[index].is_none())
    }

    fn put(&mut self, pos: GridPos, cell: MergedCell) {
        if let Some(index) = self.size.index_of(pos) {
            self.cells[index] = Some(cell);
        }
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Place one source tile drawn at `pos`
    ///
    /// `image_height` and `base` come from the tile, `row_height` is the
    /// pixel height of one grid row.
    pub fn place(&mut self, pos: GridPos, tile: TileRef, image_height: u32, base: i32, row_height: u32) -> Placement {
        let y = i64::from(pos.y);
        let height = i64::from(image_height);
        let row = i64::from(row_height.max(1));

        // Integer division truncates toward zero
        let base_y = y - (height - i64::from(base)) / row;

        let candidates = [
            (Placement::Anchor, base_y),
            (Placement::Above, base_y - 1),
            (Placement::Below, base_y + 1),
        ];

        for (placement, target_y) in candidates {
            let Ok(target_y) = i32::try_from(target_y) else {
                continue;
            };
            let target = GridPos::new(pos.x, target_y);
            if !self.is_free(target) {
                continue;
            }

            let base = match placement {
                Placement::Above => {
                    let rebased = height - (y - i64::from(target_y)) * row;
                    tracing::debug!("{} -> {} base: {}", pos.y, base_y, rebased);
                    saturate(rebased)
                }
                _ => base,
            };

            self.put(target, MergedCell { tile, base });
            self.stats.record(placement);
            return placement;
        }

        tracing::warn!(
            "Cannot find a free row for object at ({}, {}) anchored on row {}; dropped",
            pos.x,
            pos.y,
            base_y
        );
        self.stats.record(Placement::Dropped);
        Placement::Dropped
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Merge object layers into one plane
///
/// Layers are visited in the given order, each row-major. Returns `None`
/// when `layers` is empty.
pub fn merge_layers(doc: &MapDocument, layers: &[&TileLayer], row_height: u32) -> Option<MergedLayer> {
    if layers.is_empty() {
        return None;
    }

    let mut merged = MergedLayer::new(doc.size);

    for layer in layers {
        for (pos, tile_ref) in layer.occupied() {
            let Some(tile) = doc.tile(tile_ref) else {
                tracing::warn!(
                    "Layer {:?} cell ({}, {}) references a missing tile; skipped",
                    layer.name,
                    pos.x,
                    pos.y
                );
                continue;
            };

            match tile.base() {
                Some(base) => {
                    merged.place(pos, tile_ref, tile.image_height, base, row_height);
                }
                None => merged.stats.skipped += 1,
            }
        }
    }

    let stats = merged.stats;
    tracing::debug!(
        "Merged {} object layers: {} placed ({} up, {} down), {} dropped, {} without base",
        layers.len(),
        stats.placed(),
        stats.moved_up,
        stats.moved_down,
        stats.dropped,
        stats.skipped
    );

    Some(merged)
}
