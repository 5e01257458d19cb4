use thiserror::Error;

use crate::models::PlatformId;

#[derive(Error, Debug)]
pub enum CrawlError {
    /// Content was malformed or did not have the shape the platform expects
    #[error("Failed to parse {platform} content: {message}")]
    Parse {
        platform: PlatformId,
        message: String,
    },

    /// Expected structure (or a response) never arrived within the wait bound
    #[error("Timed out waiting for {target} on {platform}")]
    Timeout { platform: PlatformId, target: String },

    /// The fetch layer could not retrieve the page
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// The output sink rejected a record
    #[error("Failed to store lead: {0}")]
    Sink(String),
}

impl CrawlError {
    pub(crate) fn parse(platform: PlatformId, message: impl ToString) -> Self {
        CrawlError::Parse {
            platform,
            message: message.to_string(),
        }
    }

    /// Whether the scheduler may try the same request again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CrawlError::Fetch { .. } | CrawlError::Timeout { .. })
    }
}
