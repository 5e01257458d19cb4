use reqwest::Url;
use scraper::ElementRef;
use serde_json::Value;

use crate::{
    error::CrawlError,
    models::{FetchedContent, Lead, PlatformId},
    platforms::{
        Extractor, Platform, last_segment, require_structure, resolve_href, search_url, text_of,
    },
};

const ORIGIN: &str = "https://dev.to";
const SEARCH_URL: &str = "https://dev.to/search";
const WAIT_SELECTOR: &str = "article, .crayons-story";
const MAX_ARTICLES: usize = 30;

/// Author card pulled from one article in the search listing
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DevToArticle {
    /// Position in the listing
    pub index: usize,
    pub author_name: String,
    pub username: String,
    pub profile_url: String,
    pub title: String,
    pub tags: Vec<String>,
}

pub fn score(article: &DevToArticle) -> i64 {
    if article.tags.len() > 3 { 7 } else { 5 }
}

#[derive(Clone, Copy, Debug)]
pub struct DevTo;

impl DevTo {
    fn parse_article(&self, index: usize, article: ElementRef) -> Option<DevToArticle> {
        let author = article.select(sel!("a[href^=\"/\"]")).next()?;
        let profile_url = resolve_href(ORIGIN, author.value().attr("href")?)?;
        let username = last_segment(&profile_url)?;

        let title = article
            .select(sel!("h2 a, h3 a"))
            .next()
            .map(text_of)
            .unwrap_or_default();

        let tags = article
            .select(sel!(".crayons-tag"))
            .map(|tag| text_of(tag).replacen('#', "", 1))
            .collect();

        Some(DevToArticle {
            index,
            author_name: text_of(author),
            username,
            profile_url,
            title,
            tags,
        })
    }
}

impl Extractor for DevTo {
    type Raw = DevToArticle;

    fn extract(&self, content: &FetchedContent) -> Result<Vec<DevToArticle>, CrawlError> {
        let document = content.document();
        require_structure(self.id(), &document, WAIT_SELECTOR)?;

        let articles: Vec<DevToArticle> = document
            .select(sel!("article.crayons-story"))
            .take(MAX_ARTICLES)
            .enumerate()
            .filter_map(|(index, article)| self.parse_article(index, article))
            .collect();

        log::info!("Found {} Dev.to leads", articles.len());
        Ok(articles)
    }

    fn normalize(&self, article: DevToArticle) -> Lead {
        let score = score(&article);
        let lead_id = format!("devto_{}_{}", article.username, article.index);

        let mut lead = Lead::new(self.id(), lead_id, article.username, &article.profile_url);
        lead.name = article.author_name;
        lead.social_links
            .insert("devto".to_string(), article.profile_url);

        lead.metadata.extend([
            ("article_title".to_string(), Value::from(article.title)),
            ("tags".to_string(), Value::from(article.tags)),
        ]);

        lead.with_score(score)
    }
}

impl Platform for DevTo {
    fn id(&self) -> PlatformId {
        PlatformId::Devto
    }

    fn search_url(&self, keyword: &str, _: &[String]) -> Url {
        search_url(SEARCH_URL, &[("q", keyword)])
    }

    fn wait_selector(&self) -> Option<&'static str> {
        Some(WAIT_SELECTOR)
    }

    fn harvest(&self, content: &FetchedContent) -> Result<Vec<Lead>, CrawlError> {
        self.extract_leads(content)
    }
}
