//! Gridset lifecycle: create, attach, resize and check the cache follows.

use tracing::info;

use super::setup::{delete_everywhere, truncate_everywhere};
use crate::cluster::{CheckError, ImageExpectation, TruncatePolicy};
use crate::config::keys::{GRIDSET, MANUAL_TRUNCATE_ON_CHANGE};
use crate::config::ConfigSchema;
use crate::error::HarnessError;
use crate::harness::Harness;
use crate::http::Transport;
use crate::rest::resources::{
    gridset_is_listed, layer_has_grid_subset, tile_size, AddGridSubset, GridSet, RemoveGridSubset,
    SetTileSize,
};
use crate::wmts::{advertises_tile_matrix_set, TileRequest};

const NAME: &str = "EPSG:2163";

pub(super) fn schema() -> ConfigSchema {
    ConfigSchema::new().entry(GRIDSET, MANUAL_TRUNCATE_ON_CHANGE, "false")
}

/// US National Atlas equal area, four zoom levels, 200x200 tiles.
fn national_atlas() -> GridSet {
    GridSet::new(
        NAME,
        2163,
        [
            -2495667.977678598,
            -2223677.196231552,
            3291070.6104286816,
            959189.3312465074,
        ],
    )
    .with_scale_denominators([2.5e7, 1e6, 1e5, 25000.0])
    .with_tile_size(200, 200)
}

pub(super) fn run<T: Transport>(harness: &Harness<T>) -> Result<(), HarnessError> {
    let manual = harness.config().get_bool(GRIDSET, MANUAL_TRUNCATE_ON_CHANGE)?;
    let policy = TruncatePolicy::from_manual_flag(manual);
    let rest = harness.rest();
    let checker = harness.checker();
    let first = harness.cluster().first();

    truncate_everywhere(harness)?;
    rest.update_on_all(
        harness.cluster(),
        |node| harness.layer_uri(node),
        RemoveGridSubset(NAME.to_string()),
    )?;
    delete_everywhere(harness, "pre-run gridset delete", |node| node.gridset(NAME))?;

    info!(gridset = NAME, "Creating gridset");
    rest.put(&first.gridset(NAME), national_atlas().to_document())?;

    checker.verify_everywhere(
        |node| node.gridsets(),
        |listing| gridset_is_listed(listing, NAME),
        &format!("gridset {} listed", NAME),
    )?;
    checker.verify_everywhere(
        |node| node.gridset(NAME),
        |gridset| gridset.has_text_at("/gridSet/name", NAME),
        &format!("gridset {}", NAME),
    )?;
    checker.assert_converged(|node| node.gridset(NAME), &[])?;

    rest.update(&harness.layer_uri(first), AddGridSubset(NAME.to_string()))?;
    checker.verify_everywhere(
        |node| harness.layer_uri(node),
        |layer| layer_has_grid_subset(layer, NAME),
        &format!("grid subset {} on layer {}", NAME, harness.layer()),
    )?;

    for node in harness.cluster() {
        let capabilities = harness.tiles().get_capabilities(node)?;
        if !advertises_tile_matrix_set(&capabilities, NAME) {
            return Err(CheckError::Resource {
                node: node.to_string(),
                uri: node.wmts().to_string(),
                description: format!("tile matrix set {} in capabilities", NAME),
            }
            .into());
        }
    }

    let first_key = TileRequest::new(harness.layer(), NAME, "image/png", 2, 1, 0);
    let second_key = first_key.at(2, 2, 1);
    checker.coherence_cycle(&first_key, &second_key, Some(&ImageExpectation::png(200, 200)))?;

    rest.update(&first.gridset(NAME), SetTileSize::square(256))?;
    checker.verify_everywhere(
        |node| node.gridset(NAME),
        |gridset| tile_size(gridset) == Some((256, 256)),
        "256x256 tiles",
    )?;
    checker.after_invalidation(policy, harness.layer())?;

    checker.coherence_cycle(&first_key, &second_key, Some(&ImageExpectation::png(256, 256)))?;
    Ok(())
}
