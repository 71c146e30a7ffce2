//! Smoke test: the layer is configured and serves tiles on every node.

use crate::cluster::ImageExpectation;
use crate::error::HarnessError;
use crate::harness::Harness;
use crate::http::Transport;
use crate::rest::resources::layer_has_grid_subset;
use crate::wmts::TileRequest;

const GRIDSET: &str = "EPSG:4326";

pub(super) fn run<T: Transport>(harness: &Harness<T>) -> Result<(), HarnessError> {
    let checker = harness.checker();

    checker.verify_everywhere(
        |node| harness.layer_uri(node),
        |layer| layer_has_grid_subset(layer, GRIDSET),
        &format!("layer {} with grid subset {}", harness.layer(), GRIDSET),
    )?;

    let request = TileRequest::new(harness.layer(), GRIDSET, "image/png", 3, 2, 3);
    checker.expect_served_everywhere(&request, &ImageExpectation::png(256, 256))?;
    Ok(())
}
