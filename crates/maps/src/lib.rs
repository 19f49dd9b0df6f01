//! # Ascq Maps
//!
//! Converts editor tile maps to and from the game's binary `.map` format.
//!
//! ## Features
//! - Editor-agnostic document model (layers, tilesets, tile properties)
//! - Layer roles by name prefix (object, floor, block, mark)
//! - Object layer merging with anchor-row collision resolution
//! - `.map` encode/decode with block layer synthesis on decode
//! - Companion document storage next to each `.map` file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ascq_maps::{CodecConfig, JsonCompanionStore, MapCodec};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), ascq_maps::MapError> {
//! let codec = MapCodec::new(CodecConfig::default());
//! let store = JsonCompanionStore::new();
//! let doc = codec.read_file(Path::new("town.map"), &store)?;
//! codec.write_file(&doc, Path::new("town-copy.map"), &store)?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod companion;
pub mod document;
pub mod error;
pub mod fallback;
pub mod layer;
pub mod merge;
pub mod selector;
pub mod tiles;

pub use codec::{has_map_extension, supports_file, MapCodec, MapInspection, MAP_EXTENSION};
pub use companion::{companion_path, CompanionStore, JsonCompanionStore};
pub use document::MapDocument;
pub use error::{MapError, Result};
pub use fallback::{ensure_fallback_tileset, fallback_tileset};
pub use layer::{Cell, TileLayer, TileRef};
pub use merge::{merge_layers, MergeStats, MergedCell, MergedLayer, Placement};
pub use selector::{classify, LayerRole, SelectedLayers};
pub use tiles::{Properties, Tile, Tileset, TilesetImage, BASE, IMAGE_INDEX, PACK_INDEX};

pub use ascq_config::{CodecConfig, LayerMarkers};
pub use ascq_core::{GridPos, GridSize};
