//! Credential strategies for outgoing requests.
//!
//! A [`Credential`] is resolved once at startup and then decorates every
//! request made in its role: the admin credential for REST calls, the user
//! credential for tile fetches.
//!
//! # Strategies
//!
//! | Type             | Decoration                                         |
//! |------------------|----------------------------------------------------|
//! | `anonymous`      | none                                               |
//! | `basic`          | `Authorization: Basic base64(username:password)`   |
//! | `bearer`         | `Authorization: Bearer <token>`                    |
//! | `token-exchange` | POST to the token endpoint, then bearer the result |
//!
//! The token exchange runs on every decoration. Tokens are not cached, so
//! each request re-authenticates and any failure aborts that request.

mod credential;
mod exchange;

use thiserror::Error;

use crate::http::TransportError;

pub use credential::{Credential, CredentialKind};

/// Errors raised while decorating a request.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    /// The token endpoint could not be reached.
    #[error("token endpoint unreachable: {0}")]
    Transport(#[from] TransportError),

    /// The token endpoint answered with a non-success status.
    #[error("token endpoint {uri} returned HTTP {status}")]
    TokenEndpointStatus { uri: String, status: u16 },

    /// The token endpoint body was not a JSON object.
    #[error("token endpoint {uri} returned an unreadable body: {reason}")]
    InvalidTokenResponse { uri: String, reason: String },

    /// The token endpoint body had no `access_token`.
    #[error("token endpoint {uri} response has no access_token")]
    MissingAccessToken { uri: String },

    /// The token request body could not be encoded.
    #[error("failed to encode token request: {0}")]
    Encode(String),
}
