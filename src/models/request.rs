use reqwest::Url;

use crate::models::PlatformId;

/// One platform specific search, immutable once planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    url: Url,
    platform: PlatformId,
    keyword: String,
}

impl SearchRequest {
    pub fn new(url: Url, platform: PlatformId, keyword: impl Into<String>) -> Self {
        Self {
            url,
            platform,
            keyword: keyword.into(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn platform(&self) -> PlatformId {
        self.platform
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }
}
