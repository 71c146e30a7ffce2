//! Server nodes and cluster-wide consistency checks.
//!
//! A [`Cluster`] is the ordered list of nodes under test. The first node is
//! where mutations are made; the last node is the alternate starting point
//! for a second tile key. The [`ConsistencyChecker`] visits nodes strictly
//! one after another, since the miss-then-hit argument relies on every
//! fetch completing before the next one starts.

mod checker;
mod node;

use thiserror::Error;

pub use checker::{CheckError, ConsistencyChecker, ImageExpectation, TruncatePolicy};
pub use node::Node;

/// Errors raised while building a cluster from configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClusterError {
    #[error("invalid node URI '{uri}': {reason}")]
    InvalidNode { uri: String, reason: String },

    #[error("no nodes configured")]
    Empty,
}

/// Ordered, non-empty list of nodes sharing a backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    nodes: Vec<Node>,
}

impl Cluster {
    pub fn new(nodes: Vec<Node>) -> Result<Self, ClusterError> {
        if nodes.is_empty() {
            return Err(ClusterError::Empty);
        }
        Ok(Self { nodes })
    }

    /// Parses each URI as a node, keeping the given order.
    pub fn parse<I>(uris: I) -> Result<Self, ClusterError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let nodes = uris
            .into_iter()
            .map(|uri| Node::parse(uri.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(nodes)
    }

    /// Parses a comma separated list of node URIs, skipping blank entries.
    pub fn parse_list(list: &str) -> Result<Self, ClusterError> {
        Self::parse(list.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    /// The node mutations are made through.
    pub fn first(&self) -> &Node {
        &self.nodes[0]
    }

    /// The alternate starting node.
    pub fn last(&self) -> &Node {
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a cluster has at least one node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<'a> IntoIterator for &'a Cluster {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
