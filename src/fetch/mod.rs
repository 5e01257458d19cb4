use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CrawlError;
use crate::models::{FetchedContent, SearchRequest};

pub mod http;

pub use http::HttpFetcher;

/// Retrieves the content behind a planned search request.
///
/// Timeouts surface as [`CrawlError::Timeout`], everything else that keeps the page
/// from arriving as [`CrawlError::Fetch`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &SearchRequest) -> Result<FetchedContent, CrawlError>;
}

pub(crate) type SharedFetcher = Arc<dyn Fetcher>;
