//! Seed and truncate task bodies.

use std::collections::BTreeMap;
use std::fmt;

use crate::xml::{text_element, Document, Element, ElementExt};

/// What a seed task does to the tiles in its range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedKind {
    /// Generate tiles that are missing.
    #[default]
    Seed,
    /// Regenerate every tile.
    Reseed,
    /// Remove tiles.
    Truncate,
}

impl SeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeedKind::Seed => "seed",
            SeedKind::Reseed => "reseed",
            SeedKind::Truncate => "truncate",
        }
    }
}

impl fmt::Display for SeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A seed task for one layer, gridset and format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRequest {
    pub layer: String,
    pub gridset: String,
    pub format: String,
    pub kind: SeedKind,
    /// Inclusive `(start, stop)` zoom range; all levels when absent.
    pub zoom: Option<(u32, u32)>,
    pub parameters: BTreeMap<String, String>,
}

impl SeedRequest {
    pub fn new(
        layer: impl Into<String>,
        gridset: impl Into<String>,
        format: impl Into<String>,
        kind: SeedKind,
    ) -> Self {
        Self {
            layer: layer.into(),
            gridset: gridset.into(),
            format: format.into(),
            kind,
            zoom: None,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_zoom(mut self, start: u32, stop: u32) -> Self {
        self.zoom = Some((start, stop));
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Builds the `<seedRequest>` document.
    pub fn to_document(&self) -> Document {
        let mut root = Element::new("seedRequest");
        root.push_child(text_element("name", self.layer.clone()));
        root.push_child(text_element("gridSetId", self.gridset.clone()));
        root.push_child(text_element("format", self.format.clone()));
        root.push_child(text_element("type", self.kind.as_str()));

        if let Some((start, stop)) = self.zoom {
            root.push_child(text_element("zoomStart", start.to_string()));
            root.push_child(text_element("zoomStop", stop.to_string()));
        }

        if !self.parameters.is_empty() {
            let mut parameters = Element::new("parameters");
            for (key, value) in &self.parameters {
                let mut entry = Element::new("entry");
                entry.push_child(text_element("string", key.clone()));
                entry.push_child(text_element("string", value.clone()));
                parameters.push_child(entry);
            }
            root.push_child(parameters);
        }

        Document::new(root)
    }
}

/// Body of a mass truncate of every cached tile of a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncateLayer {
    pub layer: String,
}

impl TruncateLayer {
    pub fn new(layer: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
        }
    }

    pub fn to_document(&self) -> Document {
        let mut root = Element::new("truncateLayer");
        root.push_child(text_element("layerName", self.layer.clone()));
        Document::new(root)
    }
}
