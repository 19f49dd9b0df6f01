//! `.map` codec facade
//!
//! Ties the pieces together:
//!
//! - **encode**: classify layers, merge object layers, write the header and
//!   one record per cell, compress, wrap in the `ZLIB` container
//! - **decode**: unwrap and inflate, read the header, make sure the fallback
//!   tileset exists, and rebuild the block layer from the cell flags when the
//!   companion document has none
//!
//! Decoding only rebuilds blocking: floor and object fields are walked but
//! the companion document stays the source of truth for those layers.

use crate::companion::{companion_path, CompanionStore};
use crate::document::MapDocument;
use crate::error::{MapError, Result};
use crate::fallback::ensure_fallback_tileset;
use crate::layer::{Cell, TileLayer, TileRef};
use crate::merge::{merge_layers, MergedLayer};
use crate::selector::{first_layer, LayerRole, SelectedLayers};
use ascq_config::CodecConfig;
use ascq_core::GridPos;
use ascq_protocol::{
    container, CellFlags, CellReader, CellRecord, Compressor, FloorRecord, NmpFileHeader, ObjectRecord,
    ZlibCompressor, HEADER_SIZE,
};
use bytes::BytesMut;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

/// Extension of binary map files
pub const MAP_EXTENSION: &str = "map";

/// Result of [`MapCodec::inspect`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapInspection {
    pub header: NmpFileHeader,
    pub records: Vec<CellRecord>,
}

impl MapInspection {
    /// Count of cells carrying each flag: `(tile, object, block)`
    pub fn flag_counts(&self) -> (usize, usize, usize) {
        self.records.iter().fold((0, 0, 0), |(tile, object, block), record| {
            (
                tile + usize::from(record.floor.is_some()),
                object + usize::from(record.object.is_some()),
                block + usize::from(record.block),
            )
        })
    }
}

/// Binary map codec
pub struct MapCodec<C: Compressor = ZlibCompressor> {
    config: CodecConfig,
    compressor: C,
}

impl MapCodec {
    /// Create a codec with zlib compression at the configured level
    pub fn new(config: CodecConfig) -> Self {
        let compressor = ZlibCompressor::new(config.compression_level);
        Self { config, compressor }
    }
}

impl Default for MapCodec {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl<C: Compressor> MapCodec<C> {
    /// Create a codec with a custom compressor
    pub fn with_compressor(config: CodecConfig, compressor: C) -> Self {
        Self { config, compressor }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode a document into `.map` file bytes
    pub fn encode(&self, doc: &MapDocument) -> Result<Vec<u8>> {
        let payload = self.encode_payload(doc)?;
        let bytes = container::pack(&payload, &self.compressor)?;

        tracing::info!(
            "Encoded {}x{} map: {} bytes payload, {} bytes on disk",
            doc.size.width,
            doc.size.height,
            payload.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Build the uncompressed payload: header followed by every cell record
    pub fn encode_payload(&self, doc: &MapDocument) -> Result<BytesMut> {
        doc.validate()?;

        let selected = SelectedLayers::select(doc, &self.config.markers);
        let merged = merge_layers(doc, &selected.objects, self.config.row_height).ok_or(MapError::MissingObjectLayer)?;
        let floor = selected.floor.ok_or(MapError::MissingFloorLayer)?;

        let mut buf = BytesMut::with_capacity(HEADER_SIZE + doc.size.cell_count());
        NmpFileHeader::new(doc.size).write(&mut buf);

        let mut packs = PackIndexLookup::new(doc);
        for pos in doc.size.positions() {
            let record = cell_record(doc, pos, floor, &merged, selected.block, &mut packs);
            record.write(&mut buf);
        }

        Ok(buf)
    }

    /// Decode `.map` bytes against their companion document
    ///
    /// Returns the companion document, with the fallback tileset added when
    /// missing and a block layer synthesized from the cell flags when the
    /// document has none.
    pub fn decode(&self, bytes: &[u8], companion: Option<MapDocument>) -> Result<MapDocument> {
        let mut doc =
            companion.ok_or_else(|| MapError::CompanionMapMissing("no companion document supplied".into()))?;

        let payload = container::unpack(bytes, &self.compressor)?;
        let header = NmpFileHeader::read(&payload)?;

        if header.grid_size() != doc.size {
            // The companion document is authoritative
            tracing::warn!(
                "Header size {}x{} differs from companion map {}x{}",
                header.width,
                header.height,
                doc.size.width,
                doc.size.height
            );
        }

        let tileset = ensure_fallback_tileset(&mut doc, &self.config.fallback_tileset)?;

        if first_layer(&doc.layers, LayerRole::Block, &self.config.markers).is_none() {
            let layer = self.synthesize_block_layer(&payload, &header, &doc, tileset)?;
            tracing::debug!("Synthesized block layer with {} cells", layer.occupied_count());
            doc.add_layer(layer);
        }

        tracing::info!("Decoded {}x{} map with {} layers", doc.size.width, doc.size.height, doc.layers.len());
        Ok(doc)
    }

    /// Walk the cell flags and mark blocked cells with the wall tile
    fn synthesize_block_layer(
        &self,
        payload: &[u8],
        header: &NmpFileHeader,
        doc: &MapDocument,
        tileset: usize,
    ) -> Result<TileLayer> {
        let wall = TileRef::new(tileset, self.config.wall_tile);
        if doc.tile(wall).is_none() {
            return Err(MapError::Document(format!(
                "tileset {:?} has no wall tile {}",
                self.config.fallback_tileset, self.config.wall_tile
            )));
        }

        let mut layer = TileLayer::new(self.config.block_layer_name.clone(), doc.size);
        let header_size = header.grid_size();
        let mut reader = CellReader::new(payload, header_size.cell_count());

        // Records are laid out on the header's grid; cells beyond the
        // document's grid are skipped
        for pos in header_size.positions() {
            let Some(flags) = reader.next_flags()? else {
                break;
            };
            if flags.contains(CellFlags::BLOCK) {
                layer.set_cell(pos, Cell::new(wall));
            }
        }
        reader.finish()?;

        Ok(layer)
    }

    /// Fully parse `.map` bytes without a companion document
    pub fn inspect(&self, bytes: &[u8]) -> Result<MapInspection> {
        let payload = container::unpack(bytes, &self.compressor)?;
        let header = NmpFileHeader::read(&payload)?;

        let mut reader = CellReader::new(&payload, header.grid_size().cell_count());
        let records = reader.by_ref().collect::<ascq_core::Result<Vec<_>>>()?;
        reader.finish()?;

        Ok(MapInspection { header, records })
    }

    /// Write a `.map` file and save its companion document next to it
    pub fn write_file(&self, doc: &MapDocument, path: &Path, store: &dyn CompanionStore) -> Result<()> {
        let companion = companion_path(path, store.extension());
        if companion == path {
            return Err(MapError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} would overwrite its own companion document", path.display()),
            )));
        }

        let bytes = self.encode(doc)?;
        fs::write(path, bytes)?;
        store.save(doc, &companion)?;

        tracing::info!("Wrote {} and {}", path.display(), companion.display());
        Ok(())
    }

    /// Read a `.map` file, loading its companion document first
    pub fn read_file(&self, path: &Path, store: &dyn CompanionStore) -> Result<MapDocument> {
        let companion = companion_path(path, store.extension());
        if !companion.is_file() {
            return Err(MapError::CompanionMapMissing(companion.display().to_string()));
        }

        let doc = store.load(&companion).map_err(|e| match e {
            MapError::CompanionMapMissing(_) | MapError::CompanionMapUnreadable { .. } => e,
            other => MapError::CompanionMapUnreadable {
                path: companion.clone(),
                message: other.to_string(),
            },
        })?;

        let bytes = fs::read(path)?;
        self.decode(&bytes, Some(doc))
    }
}

/// Check whether a path names a readable `.map` file
///
/// The extension must be exactly `map` and the content must start with the
/// container magic. Any I/O failure reports `false`.
pub fn supports_file(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    if !has_map_extension(path) {
        return false;
    }

    let Ok(file) = File::open(path) else {
        return false;
    };

    let mut magic = Vec::with_capacity(container::MAGIC.len());
    match file.take(container::MAGIC.len() as u64).read_to_end(&mut magic) {
        Ok(_) => container::has_magic(&magic),
        Err(_) => false,
    }
}

/// True when the path's extension is exactly `map`; the file need not exist
pub fn has_map_extension(path: impl AsRef<Path>) -> bool {
    path.as_ref().extension().and_then(|ext| ext.to_str()) == Some(MAP_EXTENSION)
}

/// Build the record for one cell
fn cell_record(
    doc: &MapDocument,
    pos: GridPos,
    floor: &TileLayer,
    merged: &MergedLayer,
    block: Option<&TileLayer>,
    packs: &mut PackIndexLookup<'_>,
) -> CellRecord {
    let floor = floor.cell_at(pos).tile.and_then(|tile_ref| {
        let image_index = doc.tile(tile_ref)?.image_index()?;
        Some(FloorRecord {
            image: image_index.wrapping_sub(1),
            pack_index: packs.get(tile_ref),
        })
    });

    let object = merged.get(pos).and_then(|cell| {
        let image_index = doc.tile(cell.tile)?.image_index()?;
        Some(ObjectRecord {
            image: image_index.wrapping_sub(1),
            pack_index: packs.get(cell.tile),
            base: cell.base as u32,
        })
    });

    CellRecord {
        block: block.is_some_and(|layer| !layer.cell_at(pos).is_empty()),
        floor,
        object,
    }
}

/// `packIndex` resolution with one warning per tileset lacking it
struct PackIndexLookup<'a> {
    doc: &'a MapDocument,
    warned: BTreeSet<usize>,
}

impl<'a> PackIndexLookup<'a> {
    fn new(doc: &'a MapDocument) -> Self {
        Self {
            doc,
            warned: BTreeSet::new(),
        }
    }

    fn get(&mut self, tile: TileRef) -> u32 {
        let tileset = self.doc.tileset(tile.tileset);
        match tileset.and_then(|tileset| tileset.pack_index()) {
            Some(pack) => pack,
            None => {
                if self.warned.insert(tile.tileset) {
                    tracing::warn!(
                        "Tileset {:?} has no packIndex; writing 0",
                        tileset.map(|t| t.name.as_str()).unwrap_or("?")
                    );
                }
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{Tile, Tileset, BASE, IMAGE_INDEX, PACK_INDEX};
    use ascq_core::GridSize;
    use ascq_protocol::container::PREFIX_LEN;
    use bytes::BufMut;

    fn default_codec() -> MapCodec {
        MapCodec::default()
    }

    /// 2x2 map: floor everywhere (imageIndex 5, pack 0), one object tile
    fn scenario() -> MapDocument {
        let size = GridSize::new(2, 2);
        let mut doc = MapDocument::new(size);

        let mut ground = Tileset::new("ground", 64, 32);
        ground.properties.set(PACK_INDEX, 0);
        let grass = ground.add_tile(|id| Tile::new(id, 64, 32).with_property(IMAGE_INDEX, 5));
        let ground = doc.add_tileset(ground);

        let mut objects = Tileset::new("objects", 64, 32);
        objects.properties.set(PACK_INDEX, 3);
        let tree = objects.add_tile(|id| {
            Tile::new(id, 64, 42)
                .with_property(IMAGE_INDEX, 9)
                .with_property(BASE, 10)
        });
        let objects = doc.add_tileset(objects);

        let floor = doc.push_layer("地表");
        for pos in size.positions() {
            floor.set_cell(pos, Cell::new(TileRef::new(ground, grass)));
        }
        doc.push_layer("物件1")
            .set_cell(GridPos::new(0, 0), Cell::new(TileRef::new(objects, tree)));
        doc
    }

    #[test]
    fn test_encode_payload_layout() {
        let codec = default_codec();
        let payload = codec.encode_payload(&scenario()).unwrap();

        // Header
        assert_eq!(&payload[0..4], &[32, 0, 0, 0]);
        assert_eq!(&payload[4..8], &[100, 0, 0, 0]);
        assert_eq!(&payload[8..12], &[2, 0, 0, 0]);
        assert_eq!(&payload[12..16], &[2, 0, 0, 0]);

        // Cell (0,0): floor + object (base_y = -1, lands on row 0, base kept)
        let cell = &payload[HEADER_SIZE..];
        assert_eq!(cell[0], (CellFlags::TILE | CellFlags::OBJECT).bits());
        assert_eq!(&cell[1..5], &[4, 0, 0, 0]);
        assert_eq!(&cell[5..9], &[0, 0, 0, 0]);
        assert_eq!(&cell[9..13], &[8, 0, 0, 0]);
        assert_eq!(&cell[13..17], &[3, 0, 0, 0]);
        assert_eq!(&cell[17..21], &[10, 0, 0, 0]);

        // Remaining three cells: floor only
        assert_eq!(payload.len(), HEADER_SIZE + 21 + 3 * 9);
        assert_eq!(cell[21], CellFlags::TILE.bits());
    }

    #[test]
    fn test_encode_container() {
        let bytes = default_codec().encode(&scenario()).unwrap();
        assert_eq!(&bytes[0..4], b"ZLIB");
        let declared = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        assert_eq!(declared as usize, HEADER_SIZE + 21 + 3 * 9);
        assert!(bytes.len() > PREFIX_LEN);
    }

    #[test]
    fn test_missing_object_layer() {
        let mut doc = scenario();
        doc.layers.retain(|layer| !layer.name.starts_with("物件"));
        assert!(matches!(default_codec().encode(&doc), Err(MapError::MissingObjectLayer)));
    }

    #[test]
    fn test_missing_floor_layer() {
        let mut doc = scenario();
        doc.layers.retain(|layer| !layer.name.starts_with("地表"));
        assert!(matches!(default_codec().encode(&doc), Err(MapError::MissingFloorLayer)));
    }

    #[test]
    fn test_object_check_precedes_floor_check() {
        let mut doc = scenario();
        doc.layers.clear();
        assert!(matches!(default_codec().encode(&doc), Err(MapError::MissingObjectLayer)));
    }

    #[test]
    fn test_empty_object_layer_is_enough() {
        let mut doc = scenario();
        doc.layers[1] = TileLayer::new("物件空", doc.size);
        let codec = default_codec();
        let inspection = codec.inspect(&codec.encode(&doc).unwrap()).unwrap();
        assert_eq!(inspection.flag_counts(), (4, 0, 0));
    }

    #[test]
    fn test_block_flags_and_missing_image_index() {
        let mut doc = scenario();
        // A floor tile without imageIndex does not set TILE
        let bare = doc.tilesets[0].add_tile(|id| Tile::new(id, 64, 32));
        doc.layers[0].set_cell(GridPos::new(1, 1), Cell::new(TileRef::new(0, bare)));

        let block = doc.push_layer("阻挡");
        block.set_cell(GridPos::new(1, 0), Cell::new(TileRef::new(0, 0)));

        let codec = default_codec();
        let inspection = codec.inspect(&codec.encode(&doc).unwrap()).unwrap();
        let flags: Vec<_> = inspection.records.iter().map(CellRecord::flags).collect();
        assert_eq!(
            flags,
            vec![
                CellFlags::TILE | CellFlags::OBJECT,
                CellFlags::TILE | CellFlags::BLOCK,
                CellFlags::TILE,
                CellFlags::empty(),
            ]
        );
    }

    #[test]
    fn test_missing_pack_index_writes_zero() {
        let mut doc = scenario();
        doc.tilesets[1].properties.remove(PACK_INDEX);

        let codec = default_codec();
        let inspection = codec.inspect(&codec.encode(&doc).unwrap()).unwrap();
        assert_eq!(inspection.records[0].object.map(|o| o.pack_index), Some(0));
    }

    #[test]
    fn test_negative_base_and_zero_image_index() {
        let mut doc = scenario();
        doc.tilesets[1].tiles[0].properties.set(BASE, -22);
        doc.tilesets[0].tiles[0].properties.set(IMAGE_INDEX, 0);

        let codec = default_codec();
        let inspection = codec.inspect(&codec.encode(&doc).unwrap()).unwrap();
        let first = inspection.records[0];
        assert_eq!(first.floor.map(|f| f.image), Some(u32::MAX));
        // base_y = 0 - (42 + 22) / 32 = -2; rows -2, -3 and -1 are all outside the grid
        assert!(first.object.is_none());
    }

    #[test]
    fn test_invalid_document_rejected() {
        let mut doc = scenario();
        doc.layers[0].set_cell(GridPos::new(0, 0), Cell::new(TileRef::new(9, 0)));
        assert!(matches!(default_codec().encode(&doc), Err(MapError::Document(_))));
    }

    #[test]
    fn test_decode_requires_companion() {
        let codec = default_codec();
        let bytes = codec.encode(&scenario()).unwrap();
        assert!(matches!(codec.decode(&bytes, None), Err(MapError::CompanionMapMissing(_))));
    }

    #[test]
    fn test_decode_bad_magic() {
        let codec = default_codec();
        let mut bytes = codec.encode(&scenario()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(codec.decode(&bytes, Some(scenario())), Err(MapError::BadMagic(_))));
    }

    #[test]
    fn test_decode_bad_length() {
        let codec = default_codec();
        let mut bytes = codec.encode(&scenario()).unwrap();
        bytes[4] = bytes[4].wrapping_add(1);
        assert!(matches!(
            codec.decode(&bytes, Some(scenario())),
            Err(MapError::DecompressionError(_))
        ));
    }

    #[test]
    fn test_decode_synthesizes_block_layer() {
        let codec = default_codec();
        let mut source = scenario();
        source
            .push_layer("阻挡")
            .set_cell(GridPos::new(1, 1), Cell::new(TileRef::new(0, 0)));
        let bytes = codec.encode(&source).unwrap();

        let decoded = codec.decode(&bytes, Some(scenario())).unwrap();
        let metro = decoded.tileset_index("metro").unwrap();
        let block = decoded.layer("阻挡").unwrap();
        assert_eq!(block.occupied_count(), 1);
        assert_eq!(block.cell_at(GridPos::new(1, 1)).tile, Some(TileRef::new(metro, 5)));
        assert_eq!(decoded.layers.len(), 3);
    }

    #[test]
    fn test_decode_keeps_existing_block_layer() {
        let codec = default_codec();
        let mut source = scenario();
        source.push_layer("阻挡");
        let bytes = codec.encode(&source).unwrap();

        let decoded = codec.decode(&bytes, Some(source.clone())).unwrap();
        assert_eq!(decoded.layers, source.layers);
        assert_eq!(decoded.tilesets.len(), source.tilesets.len() + 1);
    }

    #[test]
    fn test_decode_size_mismatch_is_soft() {
        let codec = default_codec();
        let bytes = codec.encode(&scenario()).unwrap();

        let mut companion = MapDocument::new(GridSize::new(3, 3));
        companion.push_layer("地表");
        let decoded = codec.decode(&bytes, Some(companion)).unwrap();
        assert_eq!(decoded.size, GridSize::new(3, 3));
        assert_eq!(decoded.layer("阻挡").map(TileLayer::occupied_count), Some(0));
    }

    #[test]
    fn test_decode_truncated_records() {
        let codec = default_codec();
        let mut payload = codec.encode_payload(&scenario()).unwrap();
        payload.truncate(payload.len() - 4);
        let bytes = container::pack(&payload, &ZlibCompressor::default()).unwrap();

        let result = codec.decode(&bytes, Some(scenario()));
        assert!(matches!(result, Err(MapError::Format(_))));
    }

    #[test]
    fn test_decode_ignores_reserved_flag_bits() {
        let codec = default_codec();
        let size = GridSize::new(1, 2);

        let mut payload = BytesMut::new();
        NmpFileHeader::new(size).write(&mut payload);
        payload.put_u8((CellFlags::BLOCK | CellFlags::SMALLTILE).bits());
        payload.put_u8(CellFlags::BLOCK.bits());
        let bytes = container::pack(&payload, &ZlibCompressor::default()).unwrap();

        let decoded = codec.decode(&bytes, Some(MapDocument::new(size))).unwrap();
        let block = decoded.layer("阻挡").unwrap();
        assert_eq!(block.occupied_count(), 2);

        let inspection = codec.inspect(&bytes).unwrap();
        assert_eq!(inspection.flag_counts(), (0, 0, 2));
    }

    #[test]
    fn test_map_extension_without_file() {
        let dir = std::env::temp_dir().join("ascq-no-such-dir");
        assert!(has_map_extension(dir.join("town.map")));
        assert!(!supports_file(dir.join("town.map")));
        assert!(!has_map_extension(dir.join("town.MAP")));
        assert!(!has_map_extension(dir.join("town.json")));
        assert!(!has_map_extension(dir.join("map")));
    }
}
