//! Creating an S3 blob store is seen by every node.

use tracing::info;

use super::file_blobstore::BLOBSTORE;
use super::setup::{delete_everywhere, reset_blobstore};
use crate::config::keys::{AWS_ACCESS_KEY, AWS_SECRET_KEY, BUCKET, PREFIX, S3_BLOBSTORE};
use crate::config::ConfigSchema;
use crate::error::HarnessError;
use crate::harness::Harness;
use crate::http::Transport;
use crate::rest::resources::{blobstore_is_listed, stored_blobstore_id, S3BlobStore};

pub(super) fn schema() -> ConfigSchema {
    ConfigSchema::new()
        .entry(S3_BLOBSTORE, BUCKET, "Enter bucket for S3 blob store")
        .entry(S3_BLOBSTORE, PREFIX, "Enter prefix for S3 blob store")
        .entry(S3_BLOBSTORE, AWS_ACCESS_KEY, "Enter AWS access key")
        .entry(S3_BLOBSTORE, AWS_SECRET_KEY, "Enter AWS secret key")
}

fn store_from_config<T: Transport>(harness: &Harness<T>) -> Result<S3BlobStore, HarnessError> {
    let config = harness.config();
    let value = |key: &str| config.require(S3_BLOBSTORE, key).map(|v| v.trim().to_string());
    Ok(S3BlobStore::new(
        BLOBSTORE,
        value(BUCKET)?,
        value(PREFIX)?,
        value(AWS_ACCESS_KEY)?,
        value(AWS_SECRET_KEY)?,
    ))
}

pub(super) fn run<T: Transport>(harness: &Harness<T>) -> Result<(), HarnessError> {
    let store = store_from_config(harness)?;
    let checker = harness.checker();

    reset_blobstore(harness)?;
    delete_everywhere(harness, "pre-run blob store delete", |node| node.blobstore(BLOBSTORE))?;

    info!(blobstore = BLOBSTORE, bucket = %store.bucket, "Creating S3 blob store");
    harness
        .rest()
        .put(&harness.cluster().first().blobstore(BLOBSTORE), store.to_document())?;

    checker.verify_everywhere(
        |node| node.blobstores(),
        |listing| blobstore_is_listed(listing, BLOBSTORE),
        &format!("blob store {} listed", BLOBSTORE),
    )?;
    checker.verify_everywhere(
        |node| node.blobstore(BLOBSTORE),
        |doc| {
            doc.root().name == "S3BlobStore" && stored_blobstore_id(doc).as_deref() == Some(BLOBSTORE)
        },
        &format!("S3 blob store {}", BLOBSTORE),
    )?;
    Ok(())
}
