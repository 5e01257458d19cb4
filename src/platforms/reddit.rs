use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::CrawlError,
    models::{FetchedContent, Lead, PlatformId},
    platforms::{Extractor, Platform, parse_json, records, search_url},
    utils::iso_from_unix,
};

const SEARCH_URL: &str = "https://www.reddit.com/search.json";
const DELETED_AUTHOR: &str = "[deleted]";

#[derive(Debug, Deserialize)]
struct Child {
    data: RedditPost,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RedditPost {
    pub id: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub permalink: Option<String>,
    pub subreddit: Option<String>,
    pub score: Option<i64>,
    pub num_comments: Option<u64>,
    pub created_utc: Option<f64>,
}

pub fn score(post: &RedditPost) -> i64 {
    if post.score.unwrap_or(0) > 100 { 8 } else { 5 }
}

#[derive(Clone, Copy, Debug)]
pub struct Reddit;

impl Extractor for Reddit {
    type Raw = RedditPost;

    fn extract(&self, content: &FetchedContent) -> Result<Vec<RedditPost>, CrawlError> {
        let payload = parse_json(self.id(), content)?;
        let children: Vec<Child> = records(self.id(), payload.pointer("/data/children"));
        log::info!("Found {} Reddit posts", children.len());

        Ok(children
            .into_iter()
            .map(|child| child.data)
            .filter(|post| {
                post.author
                    .as_deref()
                    .is_some_and(|author| !author.is_empty() && author != DELETED_AUTHOR)
            })
            .collect())
    }

    fn normalize(&self, post: RedditPost) -> Lead {
        let score = score(&post);
        let author = post.author.unwrap_or_default();
        let profile_url = format!("https://reddit.com/user/{author}");
        let lead_id = format!("reddit_{}_{}", author, post.id.unwrap_or_default());

        let mut lead = Lead::new(self.id(), lead_id, author, &profile_url);
        lead.social_links.insert("reddit".to_string(), profile_url);

        lead.metadata.extend([
            ("post_title".to_string(), post.title.map(Value::from).unwrap_or(Value::Null)),
            (
                "post_url".to_string(),
                Value::from(format!(
                    "https://reddit.com{}",
                    post.permalink.unwrap_or_default()
                )),
            ),
            ("subreddit".to_string(), post.subreddit.map(Value::from).unwrap_or(Value::Null)),
            ("karma".to_string(), Value::from(post.score.unwrap_or(0))),
            ("comments".to_string(), Value::from(post.num_comments.unwrap_or(0))),
            (
                "created".to_string(),
                post.created_utc
                    .and_then(iso_from_unix)
                    .map(Value::from)
                    .unwrap_or(Value::Null),
            ),
        ]);

        lead.with_score(score)
    }
}

impl Platform for Reddit {
    fn id(&self) -> PlatformId {
        PlatformId::Reddit
    }

    fn search_url(&self, keyword: &str, _: &[String]) -> Url {
        search_url(
            SEARCH_URL,
            &[
                ("q", keyword),
                ("sort", "top"),
                ("limit", "100"),
                ("type", "link"),
            ],
        )
    }

    fn harvest(&self, content: &FetchedContent) -> Result<Vec<Lead>, CrawlError> {
        self.extract_leads(content)
    }
}
