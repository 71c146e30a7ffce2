//! Blob store resources.

use crate::xml::{text_element, Document, Element, ElementExt};

/// A blob store keeping tiles on a local or shared file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlobStore {
    pub id: String,
    pub base_directory: String,
    pub file_system_block_size: u32,
    pub enabled: bool,
    pub default: bool,
}

impl FileBlobStore {
    pub fn new(id: impl Into<String>, base_directory: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            base_directory: base_directory.into(),
            file_system_block_size: 4096,
            enabled: true,
            default: false,
        }
    }

    /// Builds the `<FileBlobStore>` document.
    pub fn to_document(&self) -> Document {
        let mut root = store_root("FileBlobStore", &self.id, self.enabled, self.default);
        root.push_child(text_element("baseDirectory", self.base_directory.clone()));
        root.push_child(text_element(
            "fileSystemBlockSize",
            self.file_system_block_size.to_string(),
        ));
        Document::new(root)
    }
}

/// A blob store keeping tiles in an S3 bucket.
#[derive(Clone, PartialEq, Eq)]
pub struct S3BlobStore {
    pub id: String,
    pub bucket: String,
    pub prefix: String,
    pub access_key: String,
    pub secret_key: String,
    pub max_connections: u32,
    pub use_https: bool,
    pub use_gzip: bool,
    pub enabled: bool,
    pub default: bool,
}

impl S3BlobStore {
    pub fn new(
        id: impl Into<String>,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            bucket: bucket.into(),
            prefix: prefix.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            max_connections: 50,
            use_https: true,
            use_gzip: true,
            enabled: true,
            default: false,
        }
    }

    /// Builds the `<S3BlobStore>` document.
    pub fn to_document(&self) -> Document {
        let mut root = store_root("S3BlobStore", &self.id, self.enabled, self.default);
        root.push_child(text_element("bucket", self.bucket.clone()));
        root.push_child(text_element("prefix", self.prefix.clone()));
        root.push_child(text_element("awsAccessKey", self.access_key.clone()));
        root.push_child(text_element("awsSecretKey", self.secret_key.clone()));
        root.push_child(text_element(
            "maxConnections",
            self.max_connections.to_string(),
        ));
        root.push_child(text_element("useHTTPS", self.use_https.to_string()));
        root.push_child(text_element("useGzip", self.use_gzip.to_string()));
        Document::new(root)
    }
}

impl std::fmt::Debug for S3BlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3BlobStore")
            .field("id", &self.id)
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

fn store_root(kind: &str, id: &str, enabled: bool, default: bool) -> Element {
    let mut root = Element::new(kind);
    root.attributes
        .insert("default".to_string(), default.to_string());
    root.push_child(text_element("id", id));
    root.push_child(text_element("enabled", enabled.to_string()));
    root
}

/// Whether a `<blobStores>` listing contains `id`.
pub fn blobstore_is_listed(listing: &Document, id: &str) -> bool {
    listing.has_text_at("/blobStores/blobStore/name", id)
}

/// The `id` of a single blob store document, whatever its kind.
pub fn stored_blobstore_id(document: &Document) -> Option<String> {
    document.root().child_text("id")
}
