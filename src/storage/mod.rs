use async_trait::async_trait;

use crate::domain::DocumentRef;
use crate::error::Result;

pub mod local;

pub use local::LocalDocumentStorage;

/// Bucket of uploaded member documents.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Store `data` at the bucket-relative `path` and return the stored path.
    /// Existing objects are never overwritten.
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String>;

    async fn delete(&self, path: &str) -> Result<()>;

    /// Public URL of a bucket-relative path.
    fn public_url(&self, path: &str) -> String;

    /// URL a browser or fetcher can load for `doc`, if any. This is the only
    /// place document references are turned into URLs.
    fn resolve(&self, doc: &DocumentRef) -> Option<String> {
        match doc {
            DocumentRef::Missing | DocumentRef::Placeholder(_) => None,
            DocumentRef::Url(url) => Some(url.clone()),
            DocumentRef::Stored(path) => Some(self.public_url(path)),
        }
    }
}
