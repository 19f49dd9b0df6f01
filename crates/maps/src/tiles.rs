//! Tiles, tilesets and their property bags
//!
//! Editors store tile metadata as string-keyed, string-valued properties.
//! The codec only reads three of them, exposed through typed accessors:
//!
//! - `imageIndex` on a tile: 1-based index into the game's art
//! - `base` on a tile: anchor offset in pixels from the image bottom
//! - `packIndex` on a tileset: art pack the tileset belongs to

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Tile property holding the 1-based art index
pub const IMAGE_INDEX: &str = "imageIndex";

/// Tile property holding the anchor offset
pub const BASE: &str = "base";

/// Tileset property holding the art pack
pub const PACK_INDEX: &str = "packIndex";

/// String-keyed property bag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, String>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse an integer property
    ///
    /// A missing key is `None`. A present but unparseable value is also
    /// `None` and logged, since the codec cannot write it.
    pub fn parse<T: FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Property {} has non-integer value {:?}", key, raw);
                None
            }
        }
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = Properties::new();
        for (key, value) in iter {
            properties.set(key, value);
        }
        properties
    }
}

/// A single tile of a tileset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Tile ID within its tileset
    pub id: u32,

    /// Width of the tile image in pixels
    pub image_width: u32,

    /// Height of the tile image in pixels
    pub image_height: u32,

    /// Custom properties
    #[serde(default)]
    pub properties: Properties,
}

impl Tile {
    /// Create a tile without properties
    pub fn new(id: u32, image_width: u32, image_height: u32) -> Self {
        Self {
            id,
            image_width,
            image_height,
            properties: Properties::new(),
        }
    }

    /// Builder-style property setter
    pub fn with_property(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.properties.set(key, value);
        self
    }

    /// 1-based art index
    pub fn image_index(&self) -> Option<u32> {
        self.properties.parse(IMAGE_INDEX)
    }

    /// Anchor offset in pixels from the image bottom
    pub fn base(&self) -> Option<i32> {
        self.properties.parse(BASE)
    }
}

/// Pixel data backing a tileset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilesetImage {
    pub width: u32,
    pub height: u32,

    /// Encoded image file (PNG), base64 in companion documents
    #[serde(default, with = "base64_data")]
    pub data: Vec<u8>,
}

mod base64_data {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// A named collection of equally sized tiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tileset {
    /// Tileset name
    pub name: String,

    /// Grid cell width in pixels
    pub tile_width: u32,

    /// Grid cell height in pixels
    pub tile_height: u32,

    /// Tiles, indexed by ID
    #[serde(default)]
    pub tiles: Vec<Tile>,

    /// Custom properties
    #[serde(default)]
    pub properties: Properties,

    /// Source image, if the tileset was cut from one
    #[serde(default)]
    pub image: Option<TilesetImage>,
}

impl Tileset {
    /// Create an empty tileset
    pub fn new(name: impl Into<String>, tile_width: u32, tile_height: u32) -> Self {
        Self {
            name: name.into(),
            tile_width,
            tile_height,
            tiles: Vec::new(),
            properties: Properties::new(),
            image: None,
        }
    }

    /// Cut a tileset from an image, one tile per grid cell, row-major
    pub fn from_image(name: impl Into<String>, tile_width: u32, tile_height: u32, image: TilesetImage) -> Self {
        let mut tileset = Self::new(name, tile_width, tile_height);
        let columns = if tile_width == 0 { 0 } else { image.width / tile_width };
        let rows = if tile_height == 0 { 0 } else { image.height / tile_height };

        for id in 0..columns * rows {
            tileset.tiles.push(Tile::new(id, tile_width, tile_height));
        }
        tileset.image = Some(image);
        tileset
    }

    /// Append a tile built by `make`, which receives the new tile's ID
    pub fn add_tile(&mut self, make: impl FnOnce(u32) -> Tile) -> u32 {
        let id = self.tiles.len() as u32;
        let mut tile = make(id);
        tile.id = id;
        self.tiles.push(tile);
        id
    }

    /// Get a tile by ID
    pub fn tile(&self, id: u32) -> Option<&Tile> {
        self.tiles.get(id as usize)
    }

    /// Number of tiles
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Art pack this tileset belongs to
    pub fn pack_index(&self) -> Option<u32> {
        self.properties.parse(PACK_INDEX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let tile = Tile::new(0, 64, 96)
            .with_property(IMAGE_INDEX, 12)
            .with_property(BASE, -4);
        assert_eq!(tile.image_index(), Some(12));
        assert_eq!(tile.base(), Some(-4));

        let bare = Tile::new(1, 64, 32);
        assert_eq!(bare.image_index(), None);
        assert_eq!(bare.base(), None);
    }

    #[test]
    fn test_unparseable_property_is_missing() {
        let tile = Tile::new(0, 64, 32).with_property(IMAGE_INDEX, "twelve");
        assert!(tile.properties.contains(IMAGE_INDEX));
        assert_eq!(tile.image_index(), None);
    }

    #[test]
    fn test_pack_index() {
        let mut tileset = Tileset::new("objects", 64, 32);
        assert_eq!(tileset.pack_index(), None);
        tileset.properties.set(PACK_INDEX, " 3 ");
        assert_eq!(tileset.pack_index(), Some(3));
    }

    #[test]
    fn test_add_tile_assigns_ids() {
        let mut tileset = Tileset::new("objects", 64, 32);
        let a = tileset.add_tile(|id| Tile::new(id, 64, 32));
        let b = tileset.add_tile(|_| Tile::new(99, 64, 128));
        assert_eq!((a, b), (0, 1));
        assert_eq!(tileset.tile(1).map(|t| t.id), Some(1));
        assert_eq!(tileset.tile(1).map(|t| t.image_height), Some(128));
        assert!(tileset.tile(2).is_none());
    }

    #[test]
    fn test_from_image() {
        let image = TilesetImage { width: 64, height: 224, data: Vec::new() };
        let tileset = Tileset::from_image("metro", 64, 32, image);
        assert_eq!(tileset.tile_count(), 7);
        assert_eq!(tileset.tile(6).map(|t| t.image_height), Some(32));
    }

    #[test]
    fn test_image_data_serializes_as_base64() {
        let image = TilesetImage { width: 1, height: 1, data: vec![0x89, b'P', b'N', b'G'] };
        let json = serde_json::to_string(&image).unwrap();
        assert!(json.contains("\"iVBORw==\""));

        let parsed: TilesetImage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, image);
    }

    #[test]
    fn test_properties_from_iter() {
        let properties: Properties = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(properties.len(), 2);
        assert_eq!(properties.parse::<u32>("b"), Some(2));
    }
}
