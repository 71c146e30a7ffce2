//! Read-modify-write updates of REST resources.
//!
//! An update fetches the current document, applies a mutation to it and
//! writes the result back to the same URI. The mutation therefore always
//! sees the freshest server state rather than a copy held from earlier.
//!
//! The sequence is not atomic on the server. Another writer changing the
//! same resource between the GET and the PUT loses its change; there is no
//! version check or compare-and-swap to detect this.

use tracing::info;

use super::client::{RestClient, WriteVerb};
use super::error::{RestError, RestResult};
use crate::cluster::{Cluster, Node};
use crate::http::{Transport, Url};
use crate::xml::{Document, XmlError};

/// An edit applied to a freshly fetched resource document.
///
/// Implemented for closures taking `&mut Document`, and by the command
/// structs in [`resources`](super::resources).
pub trait ResourceMutation {
    /// Applies the edit in place.
    fn apply(self, document: &mut Document) -> Result<(), XmlError>;

    /// Short description used in logs.
    fn describe(&self) -> String {
        "custom edit".to_string()
    }
}

impl<F> ResourceMutation for F
where
    F: FnOnce(&mut Document) -> Result<(), XmlError>,
{
    fn apply(self, document: &mut Document) -> Result<(), XmlError> {
        self(document)
    }
}

impl<T: Transport> RestClient<T> {
    /// GETs `uri`, applies `mutation` and PUTs the result back.
    pub fn update<M: ResourceMutation>(&self, uri: &Url, mutation: M) -> RestResult<Document> {
        self.update_with(uri, mutation, WriteVerb::Put)
    }

    /// GETs `uri`, applies `mutation` and writes the result back with `verb`.
    ///
    /// Fails without writing if the GET or the mutation fails.
    pub fn update_with<M: ResourceMutation>(
        &self,
        uri: &Url,
        mutation: M,
        verb: WriteVerb,
    ) -> RestResult<Document> {
        info!(uri = %uri, edit = %mutation.describe(), "Updating resource");

        let mut document = self.get(uri)?;
        mutation
            .apply(&mut document)
            .map_err(|source| RestError::Mutation {
                uri: uri.to_string(),
                source,
            })?;
        self.prepare_outgoing(&mut document);
        self.put_or_post(uri, document, verb)
    }

    /// Applies the same update through every node in turn.
    ///
    /// Used to reset each node independently, for example when nodes are
    /// not yet known to share configuration.
    pub fn update_on_all<M, P>(&self, cluster: &Cluster, path: P, mutation: M) -> RestResult<()>
    where
        M: ResourceMutation + Clone,
        P: Fn(&Node) -> Url,
    {
        for node in cluster.iter() {
            self.update(&path(node), mutation.clone())?;
        }
        Ok(())
    }
}
