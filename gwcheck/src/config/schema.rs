//! Declared configuration keys and their placeholder values.

use super::keys::{
    ADMIN_CREDENTIAL, CACHE_RESULT_HEADER, CLUSTER, LAYER, NODES, REST, STRIP_CLASS_ATTRIBUTES,
    TIMEOUT_SECS, USER_CREDENTIAL,
};
use super::credentials::TYPE;
use crate::auth::CredentialKind;
use crate::http::DEFAULT_TIMEOUT_SECS;
use crate::wmts::DEFAULT_CACHE_RESULT_HEADER;

/// A key a run needs, with the value written when it is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    pub section: String,
    pub key: String,
    pub placeholder: String,
}

impl SchemaEntry {
    /// `section.key`, as reported to the operator.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.section, self.key)
    }
}

/// The set of keys a run needs, in declaration order.
///
/// Credential sections only declare their `type`; the keys that type
/// needs are resolved against the file during bootstrap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSchema {
    entries: Vec<SchemaEntry>,
    credentials: Vec<String>,
}

impl ConfigSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys every run needs: the cluster, REST options and both credentials.
    pub fn base() -> Self {
        Self::new()
            .entry(CLUSTER, NODES, "http://localhost:8080/geoserver/")
            .entry(CLUSTER, LAYER, "a layer with global extent")
            .entry(REST, STRIP_CLASS_ATTRIBUTES, "false")
            .entry(REST, TIMEOUT_SECS, &DEFAULT_TIMEOUT_SECS.to_string())
            .entry(REST, CACHE_RESULT_HEADER, DEFAULT_CACHE_RESULT_HEADER)
            .credential(ADMIN_CREDENTIAL, CredentialKind::Basic)
            .credential(USER_CREDENTIAL, CredentialKind::Anonymous)
    }

    /// Declares a credential section whose `type` defaults to `kind`.
    pub fn credential(mut self, section: &str, kind: CredentialKind) -> Self {
        if !self.credentials.iter().any(|s| s == section) {
            self.credentials.push(section.to_string());
        }
        self.entry(section, TYPE, kind.name())
    }

    /// Declares a key. A key declared twice keeps its first placeholder.
    pub fn entry(mut self, section: &str, key: &str, placeholder: &str) -> Self {
        if !self.contains(section, key) {
            self.entries.push(SchemaEntry {
                section: section.to_string(),
                key: key.to_string(),
                placeholder: placeholder.to_string(),
            });
        }
        self
    }

    /// Adds every key and credential section of `other` not declared yet.
    pub fn merge(mut self, other: ConfigSchema) -> Self {
        for section in other.credentials {
            if !self.credentials.contains(&section) {
                self.credentials.push(section);
            }
        }
        other.entries.into_iter().fold(self, |schema, e| {
            schema.entry(&e.section, &e.key, &e.placeholder)
        })
    }

    /// Sections holding a credential.
    pub fn credential_sections(&self) -> &[String] {
        &self.credentials
    }

    pub fn contains(&self, section: &str, key: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.section == section && e.key == key)
    }

    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
