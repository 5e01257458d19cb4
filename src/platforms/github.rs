use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::CrawlError,
    models::{FetchedContent, Lead, PlatformId},
    platforms::{Extractor, Platform, parse_json, records, search_url},
};

const SEARCH_URL: &str = "https://api.github.com/search/users";

/// User object from the GitHub user search API
#[derive(Debug, Default, Clone, Deserialize)]
pub struct GitHubUser {
    #[serde(default)]
    pub id: u64,
    pub login: Option<String>,
    pub html_url: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub blog: Option<String>,
    pub twitter_username: Option<String>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub public_repos: Option<u64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub created_at: Option<String>,
}

fn is_set(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|value| !value.is_empty())
}

/// Heuristic lead quality, see the tier table below. Clamped by the caller.
pub fn score(user: &GitHubUser) -> i64 {
    let mut score = 5;

    score += match user.followers.unwrap_or(0) {
        f if f > 1000 => 3,
        f if f > 100 => 2,
        f if f > 10 => 1,
        _ => 0,
    };

    score += match user.public_repos.unwrap_or(0) {
        r if r > 50 => 2,
        r if r > 10 => 1,
        _ => 0,
    };

    if is_set(&user.company) {
        score += 1;
    }
    if is_set(&user.blog) {
        score += 1;
    }
    if is_set(&user.email) {
        score += 2;
    }
    if is_set(&user.location) {
        score += 1;
    }

    score
}

#[derive(Clone, Copy, Debug)]
pub struct GitHub;

impl Extractor for GitHub {
    type Raw = GitHubUser;

    fn extract(&self, content: &FetchedContent) -> Result<Vec<GitHubUser>, CrawlError> {
        let payload = parse_json(self.id(), content)?;
        let users: Vec<GitHubUser> = records(self.id(), payload.get("items"));
        log::info!("Found {} GitHub users", users.len());
        Ok(users)
    }

    fn normalize(&self, user: GitHubUser) -> Lead {
        let score = score(&user);
        let login = user.login.unwrap_or_default();
        let html_url = user.html_url.unwrap_or_default();

        let mut lead = Lead::new(self.id(), format!("github_{}", user.id), login, &html_url);
        lead.avatar_url = user.avatar_url.unwrap_or_default();
        lead.bio = user.bio.unwrap_or_default();
        lead.company = user.company.unwrap_or_default();
        lead.location = user.location.unwrap_or_default();
        lead.email = user.email.unwrap_or_default();
        lead.website = user.blog.unwrap_or_default();

        lead.social_links.insert("github".to_string(), html_url);
        if let Some(handle) = user.twitter_username.filter(|handle| !handle.is_empty()) {
            lead.social_links
                .insert("twitter".to_string(), format!("https://twitter.com/{handle}"));
        }

        lead.metadata.extend([
            ("followers".to_string(), Value::from(user.followers.unwrap_or(0))),
            ("following".to_string(), Value::from(user.following.unwrap_or(0))),
            ("public_repos".to_string(), Value::from(user.public_repos.unwrap_or(0))),
            ("type".to_string(), user.kind.map(Value::from).unwrap_or(Value::Null)),
            ("created_at".to_string(), user.created_at.map(Value::from).unwrap_or(Value::Null)),
        ]);

        lead.with_score(score)
    }
}

impl Platform for GitHub {
    fn id(&self) -> PlatformId {
        PlatformId::Github
    }

    /// Locations are also pushed into the query as a `location:` qualifier.
    fn search_url(&self, keyword: &str, locations: &[String]) -> Url {
        let query = if locations.is_empty() {
            keyword.to_string()
        } else {
            format!("{} location:{}", keyword, locations.join(" "))
        };
        search_url(SEARCH_URL, &[("q", query.as_str()), ("per_page", "100")])
    }

    fn harvest(&self, content: &FetchedContent) -> Result<Vec<Lead>, CrawlError> {
        self.extract_leads(content)
    }
}
