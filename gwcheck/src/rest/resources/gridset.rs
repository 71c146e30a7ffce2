//! Gridset resources.

use crate::rest::ResourceMutation;
use crate::xml::{text_element, Document, Element, ElementExt, XmlError};

/// A gridset definition: projection, extent, zoom levels and tile size.
///
/// Zoom level `i` is named `{name}:{i}` and uses the `i`-th scale
/// denominator.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSet {
    pub name: String,
    pub srs_number: u32,
    /// `[min_x, min_y, max_x, max_y]` in projection units.
    pub extent: [f64; 4],
    pub align_top_left: bool,
    pub scale_denominators: Vec<f64>,
    pub meters_per_unit: f64,
    pub pixel_size: f64,
    pub tile_width: u32,
    pub tile_height: u32,
    pub y_coordinate_first: bool,
}

impl GridSet {
    /// Creates a gridset with 256x256 tiles and the standard 0.28mm pixel.
    pub fn new(name: impl Into<String>, srs_number: u32, extent: [f64; 4]) -> Self {
        Self {
            name: name.into(),
            srs_number,
            extent,
            align_top_left: false,
            scale_denominators: Vec::new(),
            meters_per_unit: 1.0,
            pixel_size: 2.8e-4,
            tile_width: 256,
            tile_height: 256,
            y_coordinate_first: false,
        }
    }

    pub fn with_scale_denominators(mut self, denominators: impl Into<Vec<f64>>) -> Self {
        self.scale_denominators = denominators.into();
        self
    }

    pub fn with_tile_size(mut self, width: u32, height: u32) -> Self {
        self.tile_width = width;
        self.tile_height = height;
        self
    }

    /// Name of zoom level `zoom`.
    pub fn scale_name(&self, zoom: usize) -> String {
        format!("{}:{}", self.name, zoom)
    }

    /// Builds the `<gridSet>` document.
    pub fn to_document(&self) -> Document {
        let mut root = Element::new("gridSet");
        root.push_child(text_element("name", self.name.clone()));

        let mut srs = Element::new("srs");
        srs.push_child(text_element("number", self.srs_number.to_string()));
        root.push_child(srs);

        let mut coords = Element::new("coords");
        for value in self.extent {
            coords.push_child(text_element("double", format!("{:?}", value)));
        }
        let mut extent = Element::new("extent");
        extent.push_child(coords);
        root.push_child(extent);

        root.push_child(text_element("alignTopLeft", self.align_top_left.to_string()));

        let mut scales = Element::new("scaleDenominators");
        for value in &self.scale_denominators {
            scales.push_child(text_element("double", format!("{:?}", value)));
        }
        root.push_child(scales);

        root.push_child(text_element("metersPerUnit", format!("{:?}", self.meters_per_unit)));
        root.push_child(text_element("pixelSize", format!("{:?}", self.pixel_size)));

        let mut names = Element::new("scaleNames");
        for zoom in 0..self.scale_denominators.len() {
            names.push_child(text_element("string", self.scale_name(zoom)));
        }
        root.push_child(names);

        root.push_child(text_element("tileHeight", self.tile_height.to_string()));
        root.push_child(text_element("tileWidth", self.tile_width.to_string()));
        root.push_child(text_element(
            "yCoordinateFirst",
            self.y_coordinate_first.to_string(),
        ));

        Document::new(root)
    }
}

/// Changes the tile size of a gridset document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetTileSize {
    pub width: u32,
    pub height: u32,
}

impl SetTileSize {
    pub fn square(size: u32) -> Self {
        Self {
            width: size,
            height: size,
        }
    }
}

impl ResourceMutation for SetTileSize {
    fn apply(self, document: &mut Document) -> Result<(), XmlError> {
        document
            .require_mut("tileHeight")?
            .set_text(self.height.to_string());
        document
            .require_mut("tileWidth")?
            .set_text(self.width.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("set tile size to {}x{}", self.width, self.height)
    }
}

/// Tile `(width, height)` of a gridset document.
pub fn tile_size(document: &Document) -> Option<(u32, u32)> {
    let width = document.text_at("/gridSet/tileWidth")?.parse().ok()?;
    let height = document.text_at("/gridSet/tileHeight")?.parse().ok()?;
    Some((width, height))
}

/// Whether a `<gridSets>` listing contains `name`.
pub fn gridset_is_listed(listing: &Document, name: &str) -> bool {
    listing.has_text_at("/gridSets/gridSet/name", name)
}
