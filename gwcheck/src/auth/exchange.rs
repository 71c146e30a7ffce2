//! Token endpoint exchange.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use super::AuthError;
use crate::http::{HttpRequest, Method, Transport, Url, ACCEPT};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Posts `fields` as JSON to `uri` and returns the `access_token` field.
pub(super) fn exchange_token<T>(
    uri: &Url,
    fields: &BTreeMap<String, String>,
    transport: &T,
) -> Result<String, AuthError>
where
    T: Transport + ?Sized,
{
    let body = serde_json::to_vec(fields).map_err(|e| AuthError::Encode(e.to_string()))?;
    let request = HttpRequest::new(Method::POST, uri.clone())
        .with_header(ACCEPT, "application/json")
        .with_body("application/json", body);

    debug!(uri = %uri, "Exchanging credentials for access token");
    let response = transport.execute(&request)?;

    if !response.status.is_success() {
        return Err(AuthError::TokenEndpointStatus {
            uri: uri.to_string(),
            status: response.status.as_u16(),
        });
    }

    let parsed: TokenResponse =
        serde_json::from_slice(&response.body).map_err(|e| AuthError::InvalidTokenResponse {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

    parsed
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::MissingAccessToken {
            uri: uri.to_string(),
        })
}
