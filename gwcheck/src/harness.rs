//! The resolved context of a verification run.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::auth::Credential;
use crate::cluster::{Cluster, ConsistencyChecker, Node};
use crate::config::keys::{
    ADMIN_CREDENTIAL, CACHE_RESULT_HEADER, CLUSTER, LAYER, NODES, REST, STRIP_CLASS_ATTRIBUTES,
    TIMEOUT_SECS, USER_CREDENTIAL,
};
use crate::config::{credential_from_section, ConfigError, ConfigFile};
use crate::error::HarnessError;
use crate::http::{ReqwestTransport, Transport, Url};
use crate::rest::{RestClient, RestResult};
use crate::wmts::TileFetcher;

/// Everything a scenario needs, built once from configuration.
///
/// The REST client carries the admin credential and the tile fetcher the
/// user credential; both share one transport.
pub struct Harness<T: Transport> {
    config: ConfigFile,
    cluster: Cluster,
    layer: String,
    rest: RestClient<T>,
    tiles: TileFetcher<T>,
}

impl Harness<ReqwestTransport> {
    /// Builds a harness over HTTP using the configured timeout.
    pub fn from_config(config: ConfigFile) -> Result<Self, HarnessError> {
        let transport = ReqwestTransport::with_timeout(request_timeout(&config)?)?;
        Self::with_transport(config, Arc::new(transport))
    }
}

impl<T: Transport> Harness<T> {
    /// Builds a harness over the given transport.
    pub fn with_transport(config: ConfigFile, transport: Arc<T>) -> Result<Self, HarnessError> {
        let cluster = Cluster::parse(config.get_list(CLUSTER, NODES)?)?;
        let layer = config.require(CLUSTER, LAYER)?.trim().to_string();
        let admin: Credential = credential_from_section(&config, ADMIN_CREDENTIAL)?;
        let user: Credential = credential_from_section(&config, USER_CREDENTIAL)?;
        let strip = config.get_bool(REST, STRIP_CLASS_ATTRIBUTES)?;
        let cache_header = config.require(REST, CACHE_RESULT_HEADER)?.trim().to_string();

        info!(
            nodes = cluster.len(),
            layer = %layer,
            admin = admin.kind().name(),
            user = user.kind().name(),
            "Harness ready"
        );

        Ok(Self {
            rest: RestClient::new(Arc::clone(&transport), admin).with_class_stripping(strip),
            tiles: TileFetcher::new(transport, user).with_cache_header(cache_header),
            config,
            cluster,
            layer,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    /// The layer under test.
    pub fn layer(&self) -> &str {
        &self.layer
    }

    pub fn rest(&self) -> &RestClient<T> {
        &self.rest
    }

    pub fn tiles(&self) -> &TileFetcher<T> {
        &self.tiles
    }

    pub fn checker(&self) -> ConsistencyChecker<'_, T> {
        ConsistencyChecker::new(&self.cluster, &self.rest, &self.tiles)
    }

    /// URI of the layer under test on `node`.
    pub fn layer_uri(&self, node: &Node) -> Url {
        node.layer(&self.layer)
    }

    /// Accepts a server rejection during setup, logging it.
    ///
    /// Deleting a resource that does not exist yet, or truncating a layer
    /// whose gridset is gone, is expected before a run. Transport and
    /// credential failures are still returned.
    pub fn tolerate<R>(&self, action: &str, result: RestResult<R>) -> Result<Option<R>, HarnessError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_server_rejection() => {
                warn!(
                    action,
                    status = err.status().map(|s| s.as_u16()),
                    "Setup step rejected, continuing"
                );
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// The configured per-request timeout; zero is rejected.
fn request_timeout(config: &ConfigFile) -> Result<Duration, ConfigError> {
    config
        .get_positive_u64(REST, TIMEOUT_SECS)
        .map(Duration::from_secs)
}
