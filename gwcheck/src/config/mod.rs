//! INI configuration with placeholder bootstrap.
//!
//! Every run declares the keys it needs as a [`ConfigSchema`]. On startup
//! [`ConfigFile::bootstrap`] creates the file if needed, writes a
//! placeholder for every missing key and stops with
//! [`ConfigError::MissingValues`] so the operator can review them before
//! running again.
//!
//! ```ini
//! [cluster]
//! nodes = http://node1:8080/geoserver/, http://node2:8080/geoserver/
//! layer = topp:states
//!
//! [rest]
//! strip_class_attributes = false
//! timeout_secs = 30
//! cache_result_header = geowebcache-cache-result
//!
//! [admin_credential]
//! type = basic
//! username = admin
//! password = geoserver
//!
//! [user_credential]
//! type = anonymous
//! ```

mod credentials;
mod file;
mod schema;

use std::path::PathBuf;

use thiserror::Error;

pub use credentials::{credential_from_section, credential_keys};
pub use file::{ConfigFile, DEFAULT_CONFIG_FILE};
pub use schema::{ConfigSchema, SchemaEntry};

/// Section and key names.
pub mod keys {
    pub const CLUSTER: &str = "cluster";
    pub const NODES: &str = "nodes";
    pub const LAYER: &str = "layer";

    pub const REST: &str = "rest";
    pub const STRIP_CLASS_ATTRIBUTES: &str = "strip_class_attributes";
    pub const TIMEOUT_SECS: &str = "timeout_secs";
    pub const CACHE_RESULT_HEADER: &str = "cache_result_header";

    pub const ADMIN_CREDENTIAL: &str = "admin_credential";
    pub const USER_CREDENTIAL: &str = "user_credential";

    pub const GRIDSET: &str = "gridset";
    pub const PARAMETER_FILTER: &str = "parameter_filter";
    pub const MANUAL_TRUNCATE_ON_CHANGE: &str = "manual_truncate_on_change";

    pub const FILE_BLOBSTORE: &str = "file_blobstore";
    pub const PATH: &str = "path";
    pub const CACHE_DELETED_WHEN_BLOBSTORE_CHANGES: &str = "cache_deleted_when_blobstore_changes";

    pub const S3_BLOBSTORE: &str = "s3_blobstore";
    pub const BUCKET: &str = "bucket";
    pub const PREFIX: &str = "prefix";
    pub const AWS_ACCESS_KEY: &str = "aws_access_key";
    pub const AWS_SECRET_KEY: &str = "aws_secret_key";
}

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Placeholders were written for missing keys.
    #[error(
        "{} was missing values for {}; placeholders were written, please check them and run again",
        path.display(),
        keys.join(", ")
    )]
    MissingValues { path: PathBuf, keys: Vec<String> },

    #[error("missing configuration value {section}.{key}")]
    Missing { section: String, key: String },

    #[error("invalid value '{value}' for {section}.{key}: {reason}")]
    Invalid {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(section: &str, key: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
