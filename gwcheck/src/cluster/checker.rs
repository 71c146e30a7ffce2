//! Assertions that a cluster behaves as one cache.

use std::fmt;

use image::ImageFormat;
use thiserror::Error;
use tracing::info;

use super::{Cluster, Node};
use crate::http::{StatusCode, Transport, Url};
use crate::rest::{RestClient, RestError};
use crate::wmts::{CacheResult, ImageInfo, TileFetcher, TileRequest, TileResponse, WmtsError};
use crate::xml::Document;

/// A broken cluster invariant, or a failure to observe one.
#[derive(Debug, Error)]
pub enum CheckError {
    /// A resource fetched from a node does not satisfy its predicate.
    #[error("{node}: {uri}: expected {description}")]
    Resource {
        node: String,
        uri: String,
        description: String,
    },

    /// A resource differs between two nodes.
    #[error("{node}: {uri} differs from the copy on {reference}\n--- {reference}\n{expected}\n--- {node}\n{actual}")]
    Diverged {
        node: String,
        reference: String,
        uri: String,
        expected: String,
        actual: String,
    },

    /// A tile observation does not match.
    #[error("{node}: tile {tile}: expected {expected}, got {actual}")]
    Tile {
        node: String,
        tile: String,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Rest(#[from] RestError),

    #[error(transparent)]
    Wmts(#[from] WmtsError),
}

/// How cached tiles are invalidated after a configuration change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TruncatePolicy {
    /// The server truncates affected tiles itself.
    #[default]
    Automatic,
    /// A mass truncate is issued after the change.
    ManualTruncate,
}

impl TruncatePolicy {
    pub fn from_manual_flag(manual: bool) -> Self {
        if manual {
            TruncatePolicy::ManualTruncate
        } else {
            TruncatePolicy::Automatic
        }
    }
}

/// Expected format and pixel size of served tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageExpectation {
    pub format: Option<ImageFormat>,
    pub width: u32,
    pub height: u32,
}

impl ImageExpectation {
    /// Any format with the given size.
    pub fn dimensions(width: u32, height: u32) -> Self {
        Self {
            format: None,
            width,
            height,
        }
    }

    pub fn png(width: u32, height: u32) -> Self {
        Self {
            format: Some(ImageFormat::Png),
            width,
            height,
        }
    }

    pub fn jpeg(width: u32, height: u32) -> Self {
        Self {
            format: Some(ImageFormat::Jpeg),
            width,
            height,
        }
    }

    fn matches(&self, info: &ImageInfo) -> bool {
        self.format.map_or(true, |f| f == info.format)
            && info.width == self.width
            && info.height == self.height
    }
}

impl fmt::Display for ImageExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            Some(format) => write!(f, "{} {}x{}", format.to_mime_type(), self.width, self.height),
            None => write!(f, "{}x{} image", self.width, self.height),
        }
    }
}

/// Runs fetch and verify sequences across every node of a cluster.
pub struct ConsistencyChecker<'a, T: Transport> {
    cluster: &'a Cluster,
    rest: &'a RestClient<T>,
    tiles: &'a TileFetcher<T>,
}

impl<'a, T: Transport> ConsistencyChecker<'a, T> {
    pub fn new(cluster: &'a Cluster, rest: &'a RestClient<T>, tiles: &'a TileFetcher<T>) -> Self {
        Self {
            cluster,
            rest,
            tiles,
        }
    }

    pub fn cluster(&self) -> &Cluster {
        self.cluster
    }

    /// Fetches the resource from every node and checks `predicate` on each.
    pub fn verify_everywhere<P, F>(
        &self,
        path: P,
        predicate: F,
        description: &str,
    ) -> Result<(), CheckError>
    where
        P: Fn(&Node) -> Url,
        F: Fn(&Document) -> bool,
    {
        for node in self.cluster {
            let uri = path(node);
            let document = self.rest.get(&uri)?;
            if !predicate(&document) {
                return Err(CheckError::Resource {
                    node: node.to_string(),
                    uri: uri.to_string(),
                    description: description.to_string(),
                });
            }
        }
        info!(check = description, nodes = self.cluster.len(), "Verified on every node");
        Ok(())
    }

    /// Checks that every node holds the same copy of a resource as the
    /// first node, skipping the named elements.
    pub fn assert_converged<P>(&self, path: P, ignored: &[&str]) -> Result<(), CheckError>
    where
        P: Fn(&Node) -> Url,
    {
        let reference_node = self.cluster.first();
        let reference = self.rest.get(&path(reference_node))?;

        for node in self.cluster.iter().skip(1) {
            let uri = path(node);
            let copy = self.rest.get(&uri)?;
            if !reference.structurally_eq_ignoring(&copy, ignored) {
                return Err(CheckError::Diverged {
                    node: node.to_string(),
                    reference: reference_node.to_string(),
                    uri: uri.to_string(),
                    expected: reference.to_string(),
                    actual: copy.to_string(),
                });
            }
        }
        info!(uri = %path(reference_node), "Resource converged on every node");
        Ok(())
    }

    /// Fetches a fresh key from `start` expecting a MISS, then the identical
    /// key from every node expecting a HIT.
    pub fn miss_then_hit(
        &self,
        start: &Node,
        request: &TileRequest,
        expectation: Option<&ImageExpectation>,
    ) -> Result<(), CheckError> {
        info!(node = %start, tile = %request, "Expecting MISS then HIT");
        self.expect_tile(start, request, Some(CacheResult::Miss), expectation)?;
        self.expect_hit_everywhere(request, expectation)
    }

    /// Fetches the key from every node expecting a HIT.
    pub fn expect_hit_everywhere(
        &self,
        request: &TileRequest,
        expectation: Option<&ImageExpectation>,
    ) -> Result<(), CheckError> {
        for node in self.cluster {
            self.expect_tile(node, request, Some(CacheResult::Hit), expectation)?;
        }
        Ok(())
    }

    /// Fetches the key from every node expecting a matching image, whatever
    /// the cache result.
    pub fn expect_served_everywhere(
        &self,
        request: &TileRequest,
        expectation: &ImageExpectation,
    ) -> Result<(), CheckError> {
        for node in self.cluster {
            self.expect_tile(node, request, None, Some(expectation))?;
            info!(node = %node, tile = %request, "Tile served");
        }
        Ok(())
    }

    /// Fetches the key from every node expecting an error status.
    pub fn expect_rejected_everywhere(&self, request: &TileRequest) -> Result<(), CheckError> {
        info!(tile = %request, "Expecting rejection on every node");
        for node in self.cluster {
            let tile = self.tiles.get_tile(node, request)?;
            if tile.is_success() || tile.cache_result == CacheResult::Hit {
                return Err(CheckError::Tile {
                    node: node.to_string(),
                    tile: request.to_string(),
                    expected: "an error status".to_string(),
                    actual: describe(&tile),
                });
            }
        }
        Ok(())
    }

    /// Truncates `layer` through the first node when the server does not
    /// invalidate the cache by itself.
    pub fn after_invalidation(&self, policy: TruncatePolicy, layer: &str) -> Result<(), CheckError> {
        match policy {
            TruncatePolicy::Automatic => {
                info!(layer, "Relying on automatic truncate");
            }
            TruncatePolicy::ManualTruncate => {
                self.rest.mass_truncate(self.cluster.first(), layer)?;
            }
        }
        Ok(())
    }

    /// Miss-then-hit of `first_key` from the first node, then of
    /// `second_key` from the last node.
    pub fn coherence_cycle(
        &self,
        first_key: &TileRequest,
        second_key: &TileRequest,
        expectation: Option<&ImageExpectation>,
    ) -> Result<(), CheckError> {
        self.miss_then_hit(self.cluster.first(), first_key, expectation)?;
        self.miss_then_hit(self.cluster.last(), second_key, expectation)
    }

    fn expect_tile(
        &self,
        node: &Node,
        request: &TileRequest,
        expected: Option<CacheResult>,
        expectation: Option<&ImageExpectation>,
    ) -> Result<TileResponse, CheckError> {
        let tile = self.tiles.get_tile(node, request)?;
        let mismatch = |expected: String, actual: String| CheckError::Tile {
            node: node.to_string(),
            tile: request.to_string(),
            expected,
            actual,
        };

        if tile.status != StatusCode::OK {
            let wanted = match &expected {
                Some(result) => format!("HTTP 200 {}", result),
                None => "HTTP 200".to_string(),
            };
            return Err(mismatch(wanted, describe(&tile)));
        }
        if let Some(result) = expected {
            if tile.cache_result != result {
                return Err(mismatch(result.to_string(), tile.cache_result.to_string()));
            }
        }
        if let Some(image) = expectation {
            let info = tile.image_info()?;
            if !image.matches(&info) {
                return Err(mismatch(image.to_string(), info.to_string()));
            }
        }
        Ok(tile)
    }
}

fn describe(tile: &TileResponse) -> String {
    format!("HTTP {} {}", tile.status.as_u16(), tile.cache_result)
}
