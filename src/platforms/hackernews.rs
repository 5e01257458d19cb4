use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::CrawlError,
    models::{FetchedContent, Lead, PlatformId},
    platforms::{Extractor, Platform, parse_json, records, search_url},
};

const SEARCH_URL: &str = "https://hn.algolia.com/api/v1/search_by_date";

/// Algolia search hit
#[derive(Debug, Default, Clone, Deserialize)]
pub struct HnHit {
    #[serde(rename = "objectID")]
    pub object_id: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub story_title: Option<String>,
    pub points: Option<i64>,
    pub num_comments: Option<u64>,
    pub created_at: Option<String>,
}

pub fn score(hit: &HnHit) -> i64 {
    if hit.points.unwrap_or(0) > 50 { 8 } else { 5 }
}

#[derive(Clone, Copy, Debug)]
pub struct HackerNews;

impl Extractor for HackerNews {
    type Raw = HnHit;

    fn extract(&self, content: &FetchedContent) -> Result<Vec<HnHit>, CrawlError> {
        let payload = parse_json(self.id(), content)?;
        let hits: Vec<HnHit> = records(self.id(), payload.get("hits"));
        log::info!("Found {} HackerNews posts", hits.len());

        Ok(hits
            .into_iter()
            .filter(|hit| hit.author.as_deref().is_some_and(|author| !author.is_empty()))
            .collect())
    }

    fn normalize(&self, hit: HnHit) -> Lead {
        let score = score(&hit);
        let author = hit.author.unwrap_or_default();
        let object_id = hit.object_id.unwrap_or_default();
        let profile_url = format!("https://news.ycombinator.com/user?id={author}");

        let mut lead = Lead::new(
            self.id(),
            format!("hn_{author}_{object_id}"),
            author,
            &profile_url,
        );
        lead.social_links.insert("hackernews".to_string(), profile_url);

        lead.metadata.extend([
            (
                "post_title".to_string(),
                hit.title
                    .or(hit.story_title)
                    .map(Value::from)
                    .unwrap_or(Value::Null),
            ),
            (
                "post_url".to_string(),
                Value::from(format!("https://news.ycombinator.com/item?id={object_id}")),
            ),
            ("points".to_string(), Value::from(hit.points.unwrap_or(0))),
            ("comments".to_string(), Value::from(hit.num_comments.unwrap_or(0))),
            ("created".to_string(), hit.created_at.map(Value::from).unwrap_or(Value::Null)),
        ]);

        lead.with_score(score)
    }
}

impl Platform for HackerNews {
    fn id(&self) -> PlatformId {
        PlatformId::Hackernews
    }

    fn search_url(&self, keyword: &str, _: &[String]) -> Url {
        search_url(
            SEARCH_URL,
            &[("tags", "ask_hn"), ("query", keyword), ("hitsPerPage", "50")],
        )
    }

    fn harvest(&self, content: &FetchedContent) -> Result<Vec<Lead>, CrawlError> {
        self.extract_leads(content)
    }
}
