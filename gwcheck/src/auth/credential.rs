//! The closed set of credential strategies.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::exchange::exchange_token;
use super::AuthError;
use crate::http::{HttpRequest, Transport, Url, AUTHORIZATION};

/// Name of a credential strategy as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Anonymous,
    Basic,
    Bearer,
    TokenExchange,
}

impl CredentialKind {
    /// All strategies, in documentation order.
    pub fn all() -> &'static [CredentialKind] {
        &[
            CredentialKind::Anonymous,
            CredentialKind::Basic,
            CredentialKind::Bearer,
            CredentialKind::TokenExchange,
        ]
    }

    /// Configuration name of the strategy.
    pub fn name(&self) -> &'static str {
        match self {
            CredentialKind::Anonymous => "anonymous",
            CredentialKind::Basic => "basic",
            CredentialKind::Bearer => "bearer",
            CredentialKind::TokenExchange => "token-exchange",
        }
    }
}

impl FromStr for CredentialKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CredentialKind::all()
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = CredentialKind::all().iter().map(|k| k.name()).collect();
                format!("unknown credential type '{}' (expected one of {})", s, names.join(", "))
            })
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Authentication material attached to outgoing requests.
#[derive(Clone, PartialEq)]
pub enum Credential {
    /// No authentication.
    Anonymous,

    /// HTTP Basic authentication.
    Basic { username: String, password: String },

    /// A static bearer token.
    Bearer { token: String },

    /// A bearer token obtained from `uri` for every request.
    ///
    /// `fields` are sent to the endpoint as a JSON object.
    TokenExchange {
        uri: Url,
        fields: BTreeMap<String, String>,
    },
}

impl Credential {
    pub fn kind(&self) -> CredentialKind {
        match self {
            Credential::Anonymous => CredentialKind::Anonymous,
            Credential::Basic { .. } => CredentialKind::Basic,
            Credential::Bearer { .. } => CredentialKind::Bearer,
            Credential::TokenExchange { .. } => CredentialKind::TokenExchange,
        }
    }

    /// Adds this credential's authentication material to a request.
    ///
    /// For [`Credential::TokenExchange`] this performs a blocking call to the
    /// token endpoint through `transport`.
    pub fn decorate<T>(&self, request: HttpRequest, transport: &T) -> Result<HttpRequest, AuthError>
    where
        T: Transport + ?Sized,
    {
        match self {
            Credential::Anonymous => Ok(request),
            Credential::Basic { username, password } => {
                let encoded = STANDARD.encode(format!("{}:{}", username, password));
                Ok(request.with_header(AUTHORIZATION, format!("Basic {}", encoded)))
            }
            Credential::Bearer { token } => {
                Ok(request.with_header(AUTHORIZATION, format!("Bearer {}", token)))
            }
            Credential::TokenExchange { uri, fields } => {
                let token = exchange_token(uri, fields, transport)?;
                Ok(request.with_header(AUTHORIZATION, format!("Bearer {}", token)))
            }
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Anonymous => f.write_str("Anonymous"),
            Credential::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credential::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"<redacted>")
                .finish(),
            Credential::TokenExchange { uri, fields } => f
                .debug_struct("TokenExchange")
                .field("uri", &uri.as_str())
                .field("fields", &fields.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}
