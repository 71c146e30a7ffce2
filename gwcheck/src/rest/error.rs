//! Error types for REST operations.

use thiserror::Error;

use crate::auth::AuthError;
use crate::http::{Exchange, StatusCode, TransportError};
use crate::xml::XmlError;

/// Result type for REST operations.
pub type RestResult<T> = Result<T, RestError>;

/// Errors that can occur while talking to the REST API.
#[derive(Debug, Error)]
pub enum RestError {
    /// The server answered with a status other than the expected one.
    #[error("unexpected HTTP {} from {} {}\n{}", .0.response.status.as_u16(), .0.request.method, .0.request.url, .0)]
    UnexpectedStatus(Box<Exchange>),

    /// The exchange failed before a status was available.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The admin credential could not be applied.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// A resource body could not be parsed or serialized.
    #[error("invalid document for {uri}: {source}")]
    Document {
        uri: String,
        #[source]
        source: XmlError,
    },

    /// A caller-supplied mutation failed.
    #[error("failed to update {uri}: {source}")]
    Mutation {
        uri: String,
        #[source]
        source: XmlError,
    },
}

impl RestError {
    /// Status of the offending response, if the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RestError::UnexpectedStatus(exchange) => Some(exchange.response.status),
            _ => None,
        }
    }

    /// Whether the server answered with an error status.
    ///
    /// Setup code tolerates these for resources that may not exist yet;
    /// transport and authentication failures are never tolerated.
    pub fn is_server_rejection(&self) -> bool {
        matches!(self, RestError::UnexpectedStatus(_))
    }
}
