//! REST administration API client.
//!
//! This module provides the resource client used to read and write the
//! server's XML configuration resources, the read-modify-write
//! orchestration built on top of it, and builders for the resources the
//! scenarios create.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gwcheck::auth::Credential;
//! use gwcheck::http::ReqwestTransport;
//! use gwcheck::rest::{resources::SetTileSize, RestClient};
//!
//! let client = RestClient::new(Arc::new(ReqwestTransport::new()?), admin);
//! client.update(&node.gridset("EPSG:2163"), SetTileSize::square(256))?;
//! ```

mod client;
mod error;
mod orchestrator;
pub mod resources;

pub use client::{RestClient, WriteVerb, XML_CONTENT_TYPE};
pub use error::{RestError, RestResult};
pub use orchestrator::ResourceMutation;
