//! Edits and queries for cached layer resources.

use crate::rest::ResourceMutation;
use crate::xml::{text_element, Document, Element, ElementExt, XmlError};

const GRID_SUBSETS: &str = "gridSubsets";
const GRID_SUBSET: &str = "gridSubset";
const GRID_SET_NAME: &str = "gridSetName";
const BLOB_STORE_ID: &str = "blobStoreId";

/// Adds a grid subset for a gridset to a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddGridSubset(pub String);

impl ResourceMutation for AddGridSubset {
    fn apply(self, document: &mut Document) -> Result<(), XmlError> {
        if layer_has_grid_subset(document, &self.0) {
            return Ok(());
        }
        let mut subset = Element::new(GRID_SUBSET);
        subset.push_child(text_element(GRID_SET_NAME, self.0));
        document.root_mut().ensure_child(GRID_SUBSETS).push_child(subset);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("add grid subset {}", self.0)
    }
}

/// Removes any grid subset for a gridset from a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveGridSubset(pub String);

impl ResourceMutation for RemoveGridSubset {
    fn apply(self, document: &mut Document) -> Result<(), XmlError> {
        let gridset = self.0.as_str();
        if let Some(subsets) = document.find_mut(GRID_SUBSETS) {
            subsets.remove_children_where(|e| {
                e.name == GRID_SUBSET && e.child_text(GRID_SET_NAME).as_deref() == Some(gridset)
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("remove grid subset {}", self.0)
    }
}

/// Points a layer at a blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetBlobStore(pub String);

impl ResourceMutation for SetBlobStore {
    fn apply(self, document: &mut Document) -> Result<(), XmlError> {
        document.root_mut().set_child_text(BLOB_STORE_ID, self.0);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("set blob store {}", self.0)
    }
}

/// Returns a layer to the default blob store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearBlobStore;

impl ResourceMutation for ClearBlobStore {
    fn apply(self, document: &mut Document) -> Result<(), XmlError> {
        document
            .root_mut()
            .remove_children_where(|e| e.name == BLOB_STORE_ID);
        Ok(())
    }

    fn describe(&self) -> String {
        "use default blob store".to_string()
    }
}

/// Whether a layer document has a grid subset for `gridset`.
pub fn layer_has_grid_subset(document: &Document, gridset: &str) -> bool {
    document.has_text_at("gridSubsets/gridSubset/gridSetName", gridset)
}

/// The blob store a layer is assigned to, `None` for the default store.
pub fn layer_blobstore(document: &Document) -> Option<String> {
    document.text_at(BLOB_STORE_ID)
}
