//! HTTP plumbing shared by the REST client and the tile fetcher.
//!
//! Requests and responses are plain values so that credentials can decorate
//! them, diagnostics can print them, and tests can script them without a
//! live server.
//!
//! # Architecture
//!
//! ```text
//! HttpRequest ──► Credential::decorate ──► Transport::execute ──► HttpResponse
//!                                              │
//!                                              ├── ReqwestTransport (blocking reqwest)
//!                                              └── test transports
//! ```

mod diagnostic;
mod transport;
mod types;

pub use diagnostic::Exchange;
pub use transport::{ReqwestTransport, Transport, TransportError, DEFAULT_TIMEOUT_SECS};
pub use types::{HttpRequest, HttpResponse};

pub use reqwest::{Method, StatusCode, Url};

#[cfg(test)]
pub use transport::tests::MockTransport;

/// Header carrying authentication material.
pub const AUTHORIZATION: &str = "Authorization";

/// Header describing the request body encoding.
pub const CONTENT_TYPE: &str = "Content-Type";

/// Header describing acceptable response encodings.
pub const ACCEPT: &str = "Accept";
