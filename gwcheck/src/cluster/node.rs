//! Server nodes and their endpoint URIs.

use std::fmt;
use std::str::FromStr;

use crate::http::Url;

use super::ClusterError;

/// Base address of one server instance.
///
/// The base always ends with `/` and is followed by `gwc/rest/...` for
/// administration and `gwc/service/wmts` for tiles. Resource names are
/// appended as single path segments, so names containing `:` such as
/// `EPSG:2163` or `workspace:layer` are kept intact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    base: Url,
}

impl Node {
    /// Parses a node base URI.
    pub fn parse(uri: &str) -> Result<Self, ClusterError> {
        let mut base = Url::parse(uri.trim()).map_err(|e| ClusterError::InvalidNode {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ClusterError::InvalidNode {
                uri: uri.to_string(),
                reason: "expected an http(s) base URI".to_string(),
            });
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `gwc/rest/gridsets`
    pub fn gridsets(&self) -> Url {
        self.endpoint(&["gwc", "rest", "gridsets"])
    }

    /// `gwc/rest/gridsets/{name}`
    pub fn gridset(&self, name: &str) -> Url {
        self.endpoint(&["gwc", "rest", "gridsets", name])
    }

    /// `gwc/rest/layers/{name}`
    pub fn layer(&self, name: &str) -> Url {
        self.endpoint(&["gwc", "rest", "layers", name])
    }

    /// `gwc/rest/blobstores`
    pub fn blobstores(&self) -> Url {
        self.endpoint(&["gwc", "rest", "blobstores"])
    }

    /// `gwc/rest/blobstores/{name}`
    pub fn blobstore(&self, name: &str) -> Url {
        self.endpoint(&["gwc", "rest", "blobstores", name])
    }

    /// `gwc/rest/masstruncate`
    pub fn mass_truncate(&self) -> Url {
        self.endpoint(&["gwc", "rest", "masstruncate"])
    }

    /// `gwc/rest/seed/{layer}.xml`
    pub fn seed(&self, layer: &str) -> Url {
        let file = format!("{}.xml", layer);
        self.endpoint(&["gwc", "rest", "seed", &file])
    }

    /// `gwc/service/wmts`
    pub fn wmts(&self) -> Url {
        self.endpoint(&["gwc", "service", "wmts"])
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Node::parse rejects cannot-be-a-base URIs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

impl FromStr for Node {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Node::parse(s)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.as_str())
    }
}
