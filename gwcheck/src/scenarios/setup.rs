//! Setup steps shared by scenarios.

use tracing::info;

use crate::cluster::Node;
use crate::error::HarnessError;
use crate::harness::Harness;
use crate::http::{Transport, Url};
use crate::rest::resources::ClearBlobStore;

/// Mass truncates the layer through every node, tolerating rejections.
pub(super) fn truncate_everywhere<T: Transport>(harness: &Harness<T>) -> Result<(), HarnessError> {
    for node in harness.cluster() {
        let result = harness.rest().mass_truncate(node, harness.layer());
        harness.tolerate("pre-run truncate", result)?;
    }
    Ok(())
}

/// Deletes a resource through every node, tolerating rejections.
pub(super) fn delete_everywhere<T, P>(
    harness: &Harness<T>,
    action: &str,
    path: P,
) -> Result<(), HarnessError>
where
    T: Transport,
    P: Fn(&Node) -> Url,
{
    for node in harness.cluster() {
        let result = harness.rest().delete(&path(node));
        harness.tolerate(action, result)?;
    }
    Ok(())
}

/// Puts the layer back on the default blob store with an empty cache.
pub(super) fn reset_blobstore<T: Transport>(harness: &Harness<T>) -> Result<(), HarnessError> {
    info!(layer = harness.layer(), "Resetting layer to the default blob store");
    truncate_everywhere(harness)?;
    harness
        .rest()
        .update_on_all(harness.cluster(), |node| harness.layer_uri(node), ClearBlobStore)?;
    truncate_everywhere(harness)
}
