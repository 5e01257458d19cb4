use reqwest::Url;
use scraper::ElementRef;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CrawlError;
use crate::models::{FetchedContent, Lead, PlatformId};
use crate::utils::clean_text;

macro_rules! sel {
    ($sel:expr) => {
        &scraper::Selector::parse($sel).expect("invalid selector")
    };
}

/// A searchable lead source: builds its search URL and turns fetched content into leads.
pub trait Platform: Send + Sync {
    fn id(&self) -> PlatformId;

    fn search_url(&self, keyword: &str, locations: &[String]) -> Url;

    /// Selector that must appear before a rendered page is usable. `None` for JSON APIs.
    fn wait_selector(&self) -> Option<&'static str> {
        None
    }

    /// Extract and normalize every lead in the fetched content.
    fn harvest(&self, content: &FetchedContent) -> Result<Vec<Lead>, CrawlError>;
}

/// Two halves of a platform: content to raw records, raw records to leads.
pub(crate) trait Extractor {
    type Raw;

    fn extract(&self, content: &FetchedContent) -> Result<Vec<Self::Raw>, CrawlError>;

    fn normalize(&self, raw: Self::Raw) -> Lead;

    fn extract_leads(&self, content: &FetchedContent) -> Result<Vec<Lead>, CrawlError> {
        Ok(self
            .extract(content)?
            .into_iter()
            .map(|raw| self.normalize(raw))
            .collect())
    }
}

pub mod devto;
pub mod github;
pub mod hackernews;
pub mod producthunt;
pub mod reddit;

pub use devto::DevTo;
pub use github::GitHub;
pub use hackernews::HackerNews;
pub use producthunt::ProductHunt;
pub use reddit::Reddit;

/// Registered implementation for a platform.
pub fn lookup(id: PlatformId) -> &'static dyn Platform {
    match id {
        PlatformId::Github => &GitHub,
        PlatformId::Reddit => &Reddit,
        PlatformId::Devto => &DevTo,
        PlatformId::Hackernews => &HackerNews,
        PlatformId::Producthunt => &ProductHunt,
    }
}

fn search_url(base: &str, params: &[(&str, &str)]) -> Url {
    Url::parse_with_params(base, params).expect("invalid search url")
}

fn parse_json(platform: PlatformId, content: &FetchedContent) -> Result<Value, CrawlError> {
    serde_json::from_str(&content.json_text()).map_err(|e| CrawlError::parse(platform, e))
}

/// Deserialize every element of a JSON array, skipping (and logging) malformed ones.
fn records<T: DeserializeOwned>(platform: PlatformId, items: Option<&Value>) -> Vec<T> {
    let Some(items) = items.and_then(Value::as_array) else {
        log::debug!("No record array in {} payload", platform);
        return vec![];
    };

    items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(record) => Some(record),
            Err(e) => {
                log::debug!("Skipping malformed {} record: {}", platform, e);
                None
            }
        })
        .collect()
}

/// Fails with a timeout when the page never rendered the expected structure.
fn require_structure(
    platform: PlatformId,
    document: &scraper::Html,
    selector: &'static str,
) -> Result<(), CrawlError> {
    if document.select(sel!(selector)).next().is_none() {
        return Err(CrawlError::Timeout {
            platform,
            target: selector.to_string(),
        });
    }
    Ok(())
}

fn text_of(element: ElementRef) -> String {
    clean_text(&element.text().collect::<String>())
}

/// Resolve a possibly relative href against the platform origin.
fn resolve_href(origin: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    Url::parse(origin)
        .and_then(|base| base.join(href))
        .ok()
        .map(String::from)
}

/// Last non-empty path segment, e.g. the handle in `https://dev.to/jane`.
fn last_segment(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(String::from)
}
