//! Mutable XML documents for REST resources.
//!
//! Resources travel as XML in both directions. [`Document`] wraps an
//! `xmltree` element tree with the lookups and edits the reconciliation
//! code needs: slash-separated element paths, text predicates, attribute
//! stripping and structural comparison.
//!
//! Paths are element names separated by `/`. A leading `/` anchors the
//! path at the root element, whose name must then be the first segment;
//! otherwise the path is resolved from the root's children. Namespace
//! prefixes are ignored, so `Contents/TileMatrixSet/Identifier` matches
//! `ows:Identifier`.

mod document;
mod element;

use thiserror::Error;

pub use document::Document;
pub use element::{text_element, ElementExt};
pub use xmltree::{Element, XMLNode};

/// Errors raised while reading, writing or editing a document.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum XmlError {
    /// The input was not well-formed XML.
    #[error("failed to parse XML: {0}")]
    Parse(String),

    /// The tree could not be serialized.
    #[error("failed to write XML: {0}")]
    Write(String),

    /// An element required by an edit is absent.
    #[error("element '{path}' not found in <{root}>")]
    MissingElement { root: String, path: String },
}
