//! gwcheck - cache coherence verification for clustered tile servers
//!
//! This library drives a cluster of GeoWebCache-style nodes sharing one
//! configuration and one tile cache. It changes configuration through the
//! REST API of one node, then checks that every node reports the change and
//! serves tiles consistent with it: a tile fetched once from any node must be
//! a cache hit on all of them, and a change that invalidates tiles must
//! restart that cycle everywhere.
//!
//! # Layers
//!
//! - [`http`]: blocking transport with diagnostics for unexpected statuses
//! - [`auth`]: credential strategies decorating outgoing requests
//! - [`xml`]: configuration documents and path queries
//! - [`rest`]: REST resource client and read-modify-write updates
//! - [`wmts`]: GetTile and GetCapabilities requests with cache results
//! - [`cluster`]: node addressing and cross-node consistency checks
//! - [`config`], [`logging`]: INI configuration and tracing setup
//! - [`scenarios`]: the verification runs, driven through a [`Harness`]
//!
//! # Example
//!
//! ```ignore
//! use gwcheck::config::ConfigFile;
//! use gwcheck::{Harness, Scenario};
//!
//! let scenario = Scenario::Gridset;
//! let config = ConfigFile::bootstrap("gwcheck.ini", &scenario.schema())?;
//! let harness = Harness::from_config(config)?;
//! scenario.run(&harness)?;
//! ```

pub mod auth;
pub mod cluster;
pub mod config;
pub mod error;
pub mod harness;
pub mod http;
pub mod logging;
pub mod rest;
pub mod scenarios;
pub mod wmts;
pub mod xml;

pub use error::HarnessError;
pub use harness::Harness;
pub use scenarios::Scenario;
