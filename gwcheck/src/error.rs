//! Top-level error type for verification runs.

use thiserror::Error;

use crate::cluster::{CheckError, ClusterError};
use crate::config::ConfigError;
use crate::http::TransportError;
use crate::rest::RestError;
use crate::wmts::WmtsError;

/// Any error that ends a run.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid cluster configuration: {0}")]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Rest(#[from] RestError),

    #[error(transparent)]
    Wmts(#[from] WmtsError),

    #[error("check failed: {0}")]
    Check(#[from] CheckError),
}

impl HarnessError {
    /// Whether the run stopped before talking to any server.
    pub fn is_configuration(&self) -> bool {
        matches!(self, HarnessError::Config(_) | HarnessError::Cluster(_))
    }
}
