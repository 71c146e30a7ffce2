//! Resource client for the REST administration API.

use std::sync::Arc;

use tracing::{debug, info};

use super::error::{RestError, RestResult};
use super::resources::{SeedRequest, TruncateLayer};
use crate::auth::Credential;
use crate::cluster::Node;
use crate::http::{Exchange, HttpRequest, HttpResponse, Method, StatusCode, Transport, Url, ACCEPT};
use crate::xml::Document;

/// Content type of resource bodies.
pub const XML_CONTENT_TYPE: &str = "application/xml";

/// Content type the truncate and seed endpoints expect.
const TEXT_XML_CONTENT_TYPE: &str = "text/xml";

/// Verb used to write a resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteVerb {
    /// Create or replace the resource at the URI.
    #[default]
    Put,
    /// Submit to the URI.
    Post,
}

impl WriteVerb {
    pub fn method(&self) -> Method {
        match self {
            WriteVerb::Put => Method::PUT,
            WriteVerb::Post => Method::POST,
        }
    }
}

/// Client for XML configuration resources.
///
/// Every call is decorated with the admin credential and must answer
/// HTTP 200; anything else is returned as [`RestError::UnexpectedStatus`]
/// carrying the full exchange for diagnostics.
pub struct RestClient<T: Transport> {
    transport: Arc<T>,
    credential: Credential,
    strip_class_attributes: bool,
}

impl<T: Transport> RestClient<T> {
    /// Creates a client that leaves outgoing documents untouched.
    pub fn new(transport: Arc<T>, credential: Credential) -> Self {
        Self {
            transport,
            credential,
            strip_class_attributes: false,
        }
    }

    /// Enables or disables removal of `class` attributes from documents
    /// written back by [`update`](Self::update).
    ///
    /// Some server serializers embed type hints in `class` attributes that
    /// the server then rejects once the surrounding structure was edited.
    pub fn with_class_stripping(mut self, enabled: bool) -> Self {
        self.strip_class_attributes = enabled;
        self
    }

    pub fn strips_class_attributes(&self) -> bool {
        self.strip_class_attributes
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Fetches and parses the resource at `uri`.
    pub fn get(&self, uri: &Url) -> RestResult<Document> {
        let request = HttpRequest::get(uri.clone()).with_header(ACCEPT, XML_CONTENT_TYPE);
        let response = self.send(request, StatusCode::OK)?;
        Document::parse(&response.body).map_err(|source| RestError::Document {
            uri: uri.to_string(),
            source,
        })
    }

    /// Writes `document` to `uri` with PUT.
    pub fn put(&self, uri: &Url, document: Document) -> RestResult<Document> {
        self.put_or_post(uri, document, WriteVerb::Put)
    }

    /// Writes `document` to `uri` with POST.
    pub fn post(&self, uri: &Url, document: Document) -> RestResult<Document> {
        self.put_or_post(uri, document, WriteVerb::Post)
    }

    /// Writes `document` to `uri` and returns the document that was sent.
    pub fn put_or_post(&self, uri: &Url, document: Document, verb: WriteVerb) -> RestResult<Document> {
        let body = document.to_xml().map_err(|source| RestError::Document {
            uri: uri.to_string(),
            source,
        })?;
        let request =
            HttpRequest::new(verb.method(), uri.clone()).with_body(XML_CONTENT_TYPE, body);
        self.send(request, StatusCode::OK)?;
        Ok(document)
    }

    /// Deletes the resource at `uri` and returns the raw response body.
    pub fn delete(&self, uri: &Url) -> RestResult<String> {
        let request = HttpRequest::new(Method::DELETE, uri.clone());
        let response = self.send(request, StatusCode::OK)?;
        Ok(response.body_text())
    }

    /// Removes every cached tile of `layer` through `node`.
    pub fn mass_truncate(&self, node: &Node, layer: &str) -> RestResult<()> {
        info!(node = %node, layer, "Truncating layer");
        let body = TruncateLayer::new(layer).to_document();
        self.send_text_xml(node.mass_truncate(), &body)
    }

    /// Submits a seed, reseed or truncate task for a layer through `node`.
    pub fn seed(&self, node: &Node, request: &SeedRequest) -> RestResult<()> {
        info!(
            node = %node,
            layer = %request.layer,
            kind = request.kind.as_str(),
            "Submitting seed task"
        );
        self.send_text_xml(node.seed(&request.layer), &request.to_document())
    }

    /// Prepares a document that is about to be written back.
    pub(super) fn prepare_outgoing(&self, document: &mut Document) {
        if self.strip_class_attributes {
            let removed = document.strip_class_attributes();
            debug!(removed, "Stripped class attributes");
        }
    }

    fn send_text_xml(&self, uri: Url, document: &Document) -> RestResult<()> {
        let body = document.to_xml().map_err(|source| RestError::Document {
            uri: uri.to_string(),
            source,
        })?;
        let request = HttpRequest::new(Method::POST, uri).with_body(TEXT_XML_CONTENT_TYPE, body);
        self.send(request, StatusCode::OK).map(|_| ())
    }

    fn send(&self, request: HttpRequest, expected: StatusCode) -> RestResult<HttpResponse> {
        let request = self.credential.decorate(request, self.transport.as_ref())?;
        let response = self.transport.execute(&request)?;

        debug!(
            method = %request.method,
            url = %request.url,
            status = response.status.as_u16(),
            "REST exchange"
        );

        if response.status != expected {
            return Err(RestError::UnexpectedStatus(Box::new(Exchange::new(
                request, response,
            ))));
        }
        Ok(response)
    }
}
