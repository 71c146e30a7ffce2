//! WMTS tile fetching.
//!
//! The fetcher builds `GetTile` requests from a [`TileRequest`] cache key,
//! decorates them with the end-user credential and reports what the server
//! answered: status, cache result, headers and body. Assertions on those
//! observations live in [`cluster`](crate::cluster).

mod fetcher;
mod request;
mod response;

use thiserror::Error;

use crate::auth::AuthError;
use crate::http::{Exchange, TransportError};
use crate::xml::XmlError;

pub use fetcher::{advertises_tile_matrix_set, TileFetcher, DEFAULT_CACHE_RESULT_HEADER};
pub use request::TileRequest;
pub use response::{CacheResult, ImageInfo, TileResponse};

#[cfg(test)]
pub(crate) use response::tests::encoded_image;

/// Errors raised while fetching from the WMTS endpoint.
#[derive(Debug, Error)]
pub enum WmtsError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("user credential failed: {0}")]
    Auth(#[from] AuthError),

    /// A capabilities request did not answer 200.
    #[error("unexpected HTTP {} from {} {}\n{}", .0.response.status.as_u16(), .0.request.method, .0.request.url, .0)]
    UnexpectedStatus(Box<Exchange>),

    #[error("invalid capabilities document from {url}: {source}")]
    Capabilities {
        url: String,
        #[source]
        source: XmlError,
    },

    /// A tile body could not be read as an image.
    #[error("tile from {url} is not a readable image: {reason}")]
    Image { url: String, reason: String },
}
