//! Verification scenarios run against a live cluster.
//!
//! Each scenario prepares the cluster, applies configuration changes through
//! one node and checks that every node reflects them, both in the REST
//! configuration and in the tiles it serves. A scenario declares the
//! configuration keys it needs on top of the base set, so a missing value is
//! reported before any request is made.

mod basics;
mod file_blobstore;
mod gridset;
mod parameter_filter;
mod s3_blobstore;
mod setup;

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use tracing::info;

use crate::config::ConfigSchema;
use crate::error::HarnessError;
use crate::harness::Harness;
use crate::http::Transport;

/// A named verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// The layer is configured and served everywhere.
    Basics,
    /// Gridset creation, attachment and tile size change.
    Gridset,
    /// Moving the layer onto a file blob store.
    FileBlobStore,
    /// Creating an S3 blob store.
    S3BlobStore,
    /// String parameter filters with case and locale normalization.
    ParameterFilter,
}

impl Scenario {
    /// Every scenario, in the order `all` runs them.
    pub fn all() -> &'static [Scenario] {
        &[
            Scenario::Basics,
            Scenario::Gridset,
            Scenario::FileBlobStore,
            Scenario::S3BlobStore,
            Scenario::ParameterFilter,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Basics => "basics",
            Scenario::Gridset => "gridset",
            Scenario::FileBlobStore => "file-blobstore",
            Scenario::S3BlobStore => "s3-blobstore",
            Scenario::ParameterFilter => "parameter-filter",
        }
    }

    /// Base configuration keys plus the ones this scenario reads.
    pub fn schema(&self) -> ConfigSchema {
        let extra = match self {
            Scenario::Basics => ConfigSchema::new(),
            Scenario::Gridset => gridset::schema(),
            Scenario::FileBlobStore => file_blobstore::schema(),
            Scenario::S3BlobStore => s3_blobstore::schema(),
            Scenario::ParameterFilter => parameter_filter::schema(),
        };
        ConfigSchema::base().merge(extra)
    }

    /// Schema covering every scenario in `scenarios`.
    pub fn combined_schema(scenarios: &[Scenario]) -> ConfigSchema {
        scenarios
            .iter()
            .fold(ConfigSchema::base(), |schema, s| schema.merge(s.schema()))
    }

    /// Runs the scenario, returning the first broken invariant.
    pub fn run<T: Transport>(&self, harness: &Harness<T>) -> Result<(), HarnessError> {
        let started = Instant::now();
        info!(scenario = self.name(), "Scenario starting");

        match self {
            Scenario::Basics => basics::run(harness),
            Scenario::Gridset => gridset::run(harness),
            Scenario::FileBlobStore => file_blobstore::run(harness),
            Scenario::S3BlobStore => s3_blobstore::run(harness),
            Scenario::ParameterFilter => parameter_filter::run(harness),
        }?;

        info!(
            scenario = self.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Scenario passed"
        );
        Ok(())
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Scenario::all()
            .iter()
            .copied()
            .find(|scenario| scenario.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Scenario::all().iter().map(Scenario::name).collect();
                format!("unknown scenario '{}', expected one of {}", s, names.join(", "))
            })
    }
}
