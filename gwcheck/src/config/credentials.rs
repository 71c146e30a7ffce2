//! Credentials read from configuration sections.

use std::collections::BTreeMap;

use super::{ConfigError, ConfigFile};
use crate::auth::{Credential, CredentialKind};
use crate::http::Url;

pub(super) const TYPE: &str = "type";
const URI: &str = "uri";

/// Keys a credential of `kind` needs besides `type`, with placeholders.
///
/// Token exchange fields other than `uri` are free form and not declared.
pub fn credential_keys(kind: CredentialKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        CredentialKind::Anonymous => &[],
        CredentialKind::Basic => &[("username", "admin"), ("password", "geoserver")],
        CredentialKind::Bearer => &[("token", "Enter bearer token")],
        CredentialKind::TokenExchange => &[(URI, "https://auth.example.com/token")],
    }
}

/// Builds the credential described by `section`.
///
/// `type` selects the strategy; each strategy then requires its own keys.
/// For `token-exchange` every key other than `type` and `uri` is sent to
/// the token endpoint.
pub fn credential_from_section(config: &ConfigFile, section: &str) -> Result<Credential, ConfigError> {
    let kind_name = config.require(section, TYPE)?;
    let kind: CredentialKind = kind_name
        .parse()
        .map_err(|reason: String| ConfigError::invalid(section, TYPE, kind_name, reason))?;

    match kind {
        CredentialKind::Anonymous => Ok(Credential::Anonymous),
        CredentialKind::Basic => Ok(Credential::Basic {
            username: config.require(section, "username")?.to_string(),
            password: config.require(section, "password")?.to_string(),
        }),
        CredentialKind::Bearer => Ok(Credential::Bearer {
            token: config.require(section, "token")?.to_string(),
        }),
        CredentialKind::TokenExchange => {
            let raw = config.require(section, URI)?;
            let uri = Url::parse(raw.trim())
                .map_err(|e| ConfigError::invalid(section, URI, raw, e.to_string()))?;
            let fields: BTreeMap<String, String> = config
                .section_entries(section)
                .into_iter()
                .filter(|(key, _)| key != TYPE && key != URI)
                .collect();
            Ok(Credential::TokenExchange { uri, fields })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(contents: &str) -> (TempDir, ConfigFile) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gwcheck.ini");
        std::fs::write(&path, contents).unwrap();
        let config = ConfigFile::load(&path).unwrap();
        (dir, config)
    }

    #[test]
    fn test_credential_keys_follow_kind() {
        assert!(credential_keys(CredentialKind::Anonymous).is_empty());
        let basic: Vec<&str> = credential_keys(CredentialKind::Basic).iter().map(|(k, _)| *k).collect();
        assert_eq!(basic, ["username", "password"]);
        assert_eq!(credential_keys(CredentialKind::Bearer)[0].0, "token");
        assert_eq!(credential_keys(CredentialKind::TokenExchange)[0].0, "uri");
    }

    #[test]
    fn test_basic_credential() {
        let (_dir, config) = config("[admin_credential]\ntype = basic\nusername = admin\npassword = geoserver\n");
        assert_eq!(
            credential_from_section(&config, "admin_credential").unwrap(),
            Credential::Basic {
                username: "admin".to_string(),
                password: "geoserver".to_string(),
            }
        );
    }

    #[test]
    fn test_anonymous_ignores_extra_keys() {
        let (_dir, config) = config("[user_credential]\ntype = Anonymous\ntoken = unused\n");
        assert_eq!(
            credential_from_section(&config, "user_credential").unwrap(),
            Credential::Anonymous
        );
    }

    #[test]
    fn test_missing_field_is_named() {
        let (_dir, config) = config("[user_credential]\ntype = bearer\n");
        let err = credential_from_section(&config, "user_credential").unwrap_err();
        assert_eq!(err.to_string(), "missing configuration value user_credential.token");
    }

    #[test]
    fn test_unknown_type() {
        let (_dir, config) = config("[user_credential]\ntype = kerberos\n");
        let err = credential_from_section(&config, "user_credential").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "type"));
    }

    #[test]
    fn test_token_exchange_collects_remaining_fields() {
        let (_dir, config) = config(
            "[user_credential]\ntype = token-exchange\nuri = https://auth.example.com/token\n\
             client_id = gwcheck\ngrant_type = client_credentials\n",
        );
        match credential_from_section(&config, "user_credential").unwrap() {
            Credential::TokenExchange { uri, fields } => {
                assert_eq!(uri.as_str(), "https://auth.example.com/token");
                assert_eq!(fields.len(), 2);
                assert_eq!(fields["client_id"], "gwcheck");
                assert_eq!(fields["grant_type"], "client_credentials");
            }
            other => panic!("unexpected credential: {other:?}"),
        }
    }

    #[test]
    fn test_token_exchange_requires_valid_uri() {
        let (_dir, config) = config("[user_credential]\ntype = token-exchange\nuri = not a uri\n");
        let err = credential_from_section(&config, "user_credential").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "uri"));
    }
}
