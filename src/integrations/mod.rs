use async_trait::async_trait;

use crate::error::Result;

pub mod document_fetcher;

pub use document_fetcher::HttpDocumentFetcher;

/// Bytes and declared media type of a downloaded document.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Retrieves member documents by URL for bundling.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    fn name(&self) -> &str;

    /// Download `url`. A non-success response is an error.
    async fn fetch(&self, url: &str) -> Result<FetchedDocument>;
}
