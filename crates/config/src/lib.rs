//! Ascq codec configuration
//!
//! Loads codec options from a plain `key = value` file. Every option has a
//! default matching the game's own layer naming, so an empty file (or no file
//! at all) yields a working configuration.
//!
//! ```text
//! # layer name prefixes
//! object_marker = 物件
//! floor_marker = 地表
//! compression_level = 9
//! ```

use ascq_core::{AscqError, Result};
use std::fs;
use std::path::Path;

/// Layer name prefixes used to classify layers by role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerMarkers {
    /// Prefix of object layers (all matches are merged)
    pub object: String,
    /// Prefix of the floor layer (first match wins)
    pub floor: String,
    /// Prefix of the block layer (first match wins)
    pub block: String,
    /// Prefix of the mark/decoration layer (first match wins)
    pub mark: String,
}

impl Default for LayerMarkers {
    fn default() -> Self {
        Self {
            object: "物件".into(),
            floor: "地表".into(),
            block: "阻".into(),
            mark: "遮".into(),
        }
    }
}

/// Complete codec configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Layer role prefixes
    pub markers: LayerMarkers,

    /// Name given to a block layer synthesized on decode
    pub block_layer_name: String,

    /// Name of the built-in tileset used for synthesized block cells
    pub fallback_tileset: String,

    /// Tile of the fallback tileset placed on blocked cells
    pub wall_tile: u32,

    /// zlib level, 0 (store) to 9 (best)
    pub compression_level: u32,

    /// Pixel height of one logical row, used to reproject object anchors
    pub row_height: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            markers: LayerMarkers::default(),
            block_layer_name: "阻挡".into(),
            fallback_tileset: "metro".into(),
            wall_tile: 5,
            compression_level: 6,
            row_height: 32,
        }
    }
}

impl CodecConfig {
    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse `key = value` content on top of the defaults
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some(eq_pos) = line.find('=') else {
                return Err(AscqError::Config(format!(
                    "line {}: expected `key = value`, got {:?}",
                    number + 1,
                    line
                )));
            };

            let key = line[..eq_pos].trim();
            let value = line[eq_pos + 1..].trim();
            config
                .parse_option(key, value)
                .map_err(|message| AscqError::Config(format!("line {}: {}", number + 1, message)))?;
        }

        config.validate()?;
        Ok(config)
    }

    fn parse_option(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "object_marker" => self.markers.object = value.into(),
            "floor_marker" => self.markers.floor = value.into(),
            "block_marker" => self.markers.block = value.into(),
            "mark_marker" => self.markers.mark = value.into(),
            "block_layer_name" => self.block_layer_name = value.into(),
            "fallback_tileset" => self.fallback_tileset = value.into(),
            "wall_tile" => self.wall_tile = parse_number(key, value)?,
            "compression_level" => self.compression_level = parse_number(key, value)?,
            "row_height" => self.row_height = parse_number(key, value)?,
            _ => {
                tracing::debug!("Unknown config option: {} = {}", key, value);
            }
        }
        Ok(())
    }

    /// Reject option combinations the codec cannot work with
    pub fn validate(&self) -> Result<()> {
        let markers = [
            ("object_marker", &self.markers.object),
            ("floor_marker", &self.markers.floor),
            ("block_marker", &self.markers.block),
            ("mark_marker", &self.markers.mark),
        ];
        for (key, marker) in markers {
            if marker.is_empty() {
                return Err(AscqError::Config(format!("{} must not be empty", key)));
            }
        }

        if self.compression_level > 9 {
            return Err(AscqError::Config(format!(
                "compression_level {} is out of range 0..=9",
                self.compression_level
            )));
        }

        if self.row_height == 0 {
            return Err(AscqError::Config("row_height must be positive".into()));
        }

        Ok(())
    }

    /// Log the active configuration
    pub fn display(&self) {
        tracing::info!("Codec configuration:");
        tracing::info!("  Object layers: {:?}*", self.markers.object);
        tracing::info!("  Floor layer:   {:?}*", self.markers.floor);
        tracing::info!("  Block layer:   {:?}*", self.markers.block);
        tracing::info!("  Mark layer:    {:?}*", self.markers.mark);
        tracing::info!("  Synthesized block layer: {:?}", self.block_layer_name);
        tracing::info!("  Fallback tileset: {:?} (wall tile {})", self.fallback_tileset, self.wall_tile);
        tracing::info!("  Compression level: {}", self.compression_level);
        tracing::info!("  Row height: {}px", self.row_height);
    }
}

fn parse_number(key: &str, value: &str) -> std::result::Result<u32, String> {
    value
        .parse()
        .map_err(|_| format!("invalid value for {}: {:?}", key, value))
}
