//! Layer role classification
//!
//! Layers carry no explicit role; the game's tooling encodes it as a name
//! prefix. Object layers are all collected, while for the floor, block and
//! mark roles only the first matching layer counts and later matches are
//! ignored.

use crate::document::MapDocument;
use crate::layer::TileLayer;
use ascq_config::LayerMarkers;

/// Role of a layer in the binary format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerRole {
    /// Merged into the single object plane
    Object,
    /// Ground tiles
    Floor,
    /// Impassable cells
    Block,
    /// Decoration overlay, not stored in the binary format
    Mark,
}

impl LayerRole {
    pub const ALL: [LayerRole; 4] = [LayerRole::Object, LayerRole::Floor, LayerRole::Block, LayerRole::Mark];

    /// Name prefix for this role
    pub fn marker(self, markers: &LayerMarkers) -> &str {
        match self {
            LayerRole::Object => &markers.object,
            LayerRole::Floor => &markers.floor,
            LayerRole::Block => &markers.block,
            LayerRole::Mark => &markers.mark,
        }
    }

    /// Case-sensitive prefix test against a layer name
    #[inline]
    pub fn matches(self, name: &str, markers: &LayerMarkers) -> bool {
        name.starts_with(self.marker(markers))
    }
}

/// First role (in [`LayerRole::ALL`] order) whose marker prefixes `name`
pub fn classify(name: &str, markers: &LayerMarkers) -> Option<LayerRole> {
    LayerRole::ALL.into_iter().find(|role| role.matches(name, markers))
}

/// All layers whose name matches the object marker, in document order
pub fn object_layers<'a>(layers: &'a [TileLayer], markers: &LayerMarkers) -> Vec<&'a TileLayer> {
    layers
        .iter()
        .filter(|layer| LayerRole::Object.matches(&layer.name, markers))
        .collect()
}

/// First layer matching `role`
pub fn first_layer<'a>(layers: &'a [TileLayer], role: LayerRole, markers: &LayerMarkers) -> Option<&'a TileLayer> {
    layers.iter().find(|layer| role.matches(&layer.name, markers))
}

/// Layers of a document grouped by role
#[derive(Debug, Clone, Default)]
pub struct SelectedLayers<'a> {
    pub objects: Vec<&'a TileLayer>,
    pub floor: Option<&'a TileLayer>,
    pub block: Option<&'a TileLayer>,
    pub mark: Option<&'a TileLayer>,
}

impl<'a> SelectedLayers<'a> {
    /// Classify every layer of a document
    pub fn select(doc: &'a MapDocument, markers: &LayerMarkers) -> Self {
        let layers = doc.layers.as_slice();
        Self {
            objects: object_layers(layers, markers),
            floor: first_layer(layers, LayerRole::Floor, markers),
            block: first_layer(layers, LayerRole::Block, markers),
            mark: first_layer(layers, LayerRole::Mark, markers),
        }
    }
}
