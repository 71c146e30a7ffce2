//! Moving the layer onto a file blob store restarts its cache.

use tracing::info;

use super::setup::{delete_everywhere, reset_blobstore};
use crate::cluster::ImageExpectation;
use crate::config::keys::{CACHE_DELETED_WHEN_BLOBSTORE_CHANGES, FILE_BLOBSTORE, PATH};
use crate::config::ConfigSchema;
use crate::error::HarnessError;
use crate::harness::Harness;
use crate::http::Transport;
use crate::rest::resources::{
    blobstore_is_listed, layer_blobstore, stored_blobstore_id, ClearBlobStore, FileBlobStore,
    SetBlobStore,
};
use crate::wmts::TileRequest;

pub(super) const BLOBSTORE: &str = "testBlobStore";
const GRIDSET: &str = "EPSG:4326";

pub(super) fn schema() -> ConfigSchema {
    ConfigSchema::new()
        .entry(FILE_BLOBSTORE, PATH, "/tmp/testBlobStore")
        .entry(FILE_BLOBSTORE, CACHE_DELETED_WHEN_BLOBSTORE_CHANGES, "false")
}

pub(super) fn run<T: Transport>(harness: &Harness<T>) -> Result<(), HarnessError> {
    let config = harness.config();
    let path = config.require(FILE_BLOBSTORE, PATH)?.trim().to_string();
    let cache_deleted = config.get_bool(FILE_BLOBSTORE, CACHE_DELETED_WHEN_BLOBSTORE_CHANGES)?;
    let rest = harness.rest();
    let checker = harness.checker();
    let first = harness.cluster().first();

    reset_blobstore(harness)?;
    delete_everywhere(harness, "pre-run blob store delete", |node| node.blobstore(BLOBSTORE))?;

    let first_key = TileRequest::new(harness.layer(), GRIDSET, "image/png", 2, 1, 2);
    let second_key = first_key.at(2, 1, 3);
    let image = ImageExpectation::png(256, 256);
    checker.coherence_cycle(&first_key, &second_key, Some(&image))?;

    info!(blobstore = BLOBSTORE, path = %path, "Creating file blob store");
    rest.put(
        &first.blobstore(BLOBSTORE),
        FileBlobStore::new(BLOBSTORE, path).to_document(),
    )?;
    checker.verify_everywhere(
        |node| node.blobstores(),
        |listing| blobstore_is_listed(listing, BLOBSTORE),
        &format!("blob store {} listed", BLOBSTORE),
    )?;
    checker.verify_everywhere(
        |node| node.blobstore(BLOBSTORE),
        |store| {
            store.root().name == "FileBlobStore"
                && stored_blobstore_id(store).as_deref() == Some(BLOBSTORE)
        },
        &format!("file blob store {}", BLOBSTORE),
    )?;

    rest.update(&harness.layer_uri(first), SetBlobStore(BLOBSTORE.to_string()))?;
    checker.verify_everywhere(
        |node| harness.layer_uri(node),
        |layer| layer_blobstore(layer).as_deref() == Some(BLOBSTORE),
        &format!("layer {} on blob store {}", harness.layer(), BLOBSTORE),
    )?;
    checker.coherence_cycle(&first_key, &second_key, Some(&image))?;

    if cache_deleted {
        info!("Reverting to the default blob store");
        rest.update(&harness.layer_uri(first), ClearBlobStore)?;
        checker.verify_everywhere(
            |node| harness.layer_uri(node),
            |layer| layer_blobstore(layer).is_none(),
            "layer on the default blob store",
        )?;
        checker.coherence_cycle(&first_key, &second_key, Some(&image))?;
    }
    Ok(())
}
