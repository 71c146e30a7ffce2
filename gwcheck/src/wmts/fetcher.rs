//! Tile and capabilities requests against the WMTS endpoint.

use std::sync::Arc;

use tracing::debug;

use super::{TileRequest, TileResponse, WmtsError};
use crate::auth::Credential;
use crate::cluster::Node;
use crate::http::{Exchange, HttpRequest, StatusCode, Transport};
use crate::xml::Document;

/// Response header reporting whether a tile came from the cache.
pub const DEFAULT_CACHE_RESULT_HEADER: &str = "geowebcache-cache-result";

/// Fetches tiles with the end-user credential.
///
/// `get_tile` never inspects the status: a rejected tile is an observation
/// like any other and is returned as-is.
pub struct TileFetcher<T: Transport> {
    transport: Arc<T>,
    credential: Credential,
    cache_header: String,
}

impl<T: Transport> TileFetcher<T> {
    pub fn new(transport: Arc<T>, credential: Credential) -> Self {
        Self {
            transport,
            credential,
            cache_header: DEFAULT_CACHE_RESULT_HEADER.to_string(),
        }
    }

    /// Reads the cache result from a different response header.
    pub fn with_cache_header(mut self, header: impl Into<String>) -> Self {
        self.cache_header = header.into();
        self
    }

    pub fn cache_header(&self) -> &str {
        &self.cache_header
    }

    /// Requests one tile from `node`.
    pub fn get_tile(&self, node: &Node, request: &TileRequest) -> Result<TileResponse, WmtsError> {
        let url = request.url(node);
        let http = self
            .credential
            .decorate(HttpRequest::get(url.clone()), self.transport.as_ref())?;
        let response = self.transport.execute(&http)?;

        let tile = TileResponse::new(request.clone(), url, response, &self.cache_header);
        debug!(
            node = %node,
            tile = %request,
            status = tile.status.as_u16(),
            cache = %tile.cache_result,
            "GetTile"
        );
        Ok(tile)
    }

    /// Fetches and parses the capabilities document of `node`.
    pub fn get_capabilities(&self, node: &Node) -> Result<Document, WmtsError> {
        let mut url = node.wmts();
        url.query_pairs_mut()
            .append_pair("SERVICE", "WMTS")
            .append_pair("VERSION", "1.0.0")
            .append_pair("REQUEST", "GetCapabilities");

        let http = self
            .credential
            .decorate(HttpRequest::get(url.clone()), self.transport.as_ref())?;
        let response = self.transport.execute(&http)?;
        debug!(node = %node, status = response.status.as_u16(), "GetCapabilities");

        if response.status != StatusCode::OK {
            return Err(WmtsError::UnexpectedStatus(Box::new(Exchange::new(
                http, response,
            ))));
        }
        Document::parse(&response.body).map_err(|source| WmtsError::Capabilities {
            url: url.to_string(),
            source,
        })
    }
}

/// Whether a capabilities document advertises `gridset` as a tile matrix set.
pub fn advertises_tile_matrix_set(capabilities: &Document, gridset: &str) -> bool {
    capabilities.has_text_at("Contents/TileMatrixSet/Identifier", gridset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpResponse, MockTransport, AUTHORIZATION};
    use crate::wmts::CacheResult;

    const CAPABILITIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Capabilities xmlns="http://www.opengis.net/wmts/1.0" xmlns:ows="http://www.opengis.net/ows/1.1" version="1.0.0">
  <Contents>
    <Layer><ows:Identifier>topp:states</ows:Identifier></Layer>
    <TileMatrixSet><ows:Identifier>EPSG:4326</ows:Identifier></TileMatrixSet>
    <TileMatrixSet><ows:Identifier>EPSG:2163</ows:Identifier></TileMatrixSet>
  </Contents>
</Capabilities>"#;

    fn node() -> Node {
        Node::parse("http://node1:8080/geoserver/").unwrap()
    }

    fn user() -> Credential {
        Credential::Bearer {
            token: "user-token".to_string(),
        }
    }

    #[test]
    fn test_get_tile_returns_rejection_without_error() {
        let mock = Arc::new(MockTransport::new());
        mock.push(HttpResponse::new(StatusCode::BAD_REQUEST, b"bad FOO".to_vec()));

        let fetcher = TileFetcher::new(Arc::clone(&mock), user());
        let request = TileRequest::new("topp:states", "EPSG:4326", "image/png", 2, 1, 2)
            .with_parameter("FOO", "X");
        let tile = fetcher.get_tile(&node(), &request).unwrap();

        assert_eq!(tile.status, StatusCode::BAD_REQUEST);
        assert_eq!(tile.cache_result, CacheResult::Absent);
        assert_eq!(tile.request, request);

        let sent = &mock.requests()[0];
        assert_eq!(sent.header(AUTHORIZATION), Some("Bearer user-token"));
        assert_eq!(sent.url, request.url(&node()));
    }

    #[test]
    fn test_custom_cache_header() {
        let mock = Arc::new(MockTransport::new());
        mock.push(HttpResponse::new(StatusCode::OK, Vec::new()).with_header("x-cache", "HIT"));

        let fetcher = TileFetcher::new(Arc::clone(&mock), user()).with_cache_header("X-Cache");
        let request = TileRequest::new("topp:states", "EPSG:4326", "image/png", 3, 2, 3);
        let tile = fetcher.get_tile(&node(), &request).unwrap();
        assert_eq!(tile.cache_result, CacheResult::Hit);
    }

    #[test]
    fn test_get_capabilities() {
        let mock = Arc::new(MockTransport::new());
        mock.push(HttpResponse::new(StatusCode::OK, CAPABILITIES.as_bytes().to_vec()));

        let fetcher = TileFetcher::new(Arc::clone(&mock), Credential::Anonymous);
        let capabilities = fetcher.get_capabilities(&node()).unwrap();

        assert!(advertises_tile_matrix_set(&capabilities, "EPSG:2163"));
        assert!(!advertises_tile_matrix_set(&capabilities, "topp:states"));
        assert!(mock.requests()[0]
            .url
            .query()
            .unwrap()
            .contains("REQUEST=GetCapabilities"));
    }

    #[test]
    fn test_get_capabilities_requires_200() {
        let mock = Arc::new(MockTransport::new());
        mock.push(HttpResponse::new(StatusCode::SERVICE_UNAVAILABLE, Vec::new()));

        let fetcher = TileFetcher::new(Arc::clone(&mock), Credential::Anonymous);
        let err = fetcher.get_capabilities(&node()).unwrap_err();
        assert!(matches!(err, WmtsError::UnexpectedStatus(_)));
    }
}
