//! Builders, edits and queries for server configuration resources.
//!
//! Builders produce the XML documents the REST API accepts for new
//! resources. Edits are [`ResourceMutation`](super::ResourceMutation)
//! commands for the read-modify-write path; each one is idempotent, so
//! applying it to a document that already has the desired state changes
//! nothing.

mod blobstore;
mod gridset;
mod layer;
mod parameter_filter;
mod seed;

pub use blobstore::{blobstore_is_listed, stored_blobstore_id, FileBlobStore, S3BlobStore};
pub use gridset::{gridset_is_listed, tile_size, GridSet, SetTileSize};
pub use layer::{
    layer_blobstore, layer_has_grid_subset, AddGridSubset, ClearBlobStore, RemoveGridSubset,
    SetBlobStore,
};
pub use parameter_filter::{
    find_parameter_filter, parameter_filter_normalization, AddParameterFilter, CaseNormalization,
    Normalization, RemoveParameterFilters, ReplaceParameterFilter, StringParameterFilter,
};
pub use seed::{SeedKind, SeedRequest, TruncateLayer};
