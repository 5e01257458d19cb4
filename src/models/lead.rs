use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::PlatformId;
use crate::utils::timestamp;

pub const MAX_LEAD_SCORE: u8 = 10;

/// Canonical lead record, normalized from any supported platform.
///
/// Unknown text fields are empty strings rather than absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    /// Platform prefixed id, e.g. `github_1234`
    pub lead_id: String,
    pub source: PlatformId,

    pub name: String,
    pub username: String,
    pub profile_url: String,
    pub avatar_url: String,

    pub bio: String,
    pub company: String,
    pub location: String,
    pub email: String,
    pub website: String,

    /// Platform name to profile URL
    pub social_links: HashMap<String, String>,
    /// Extra per-platform signal (followers, post titles, ...)
    pub metadata: HashMap<String, Value>,

    pub lead_score: u8,
}

impl Lead {
    pub fn new(
        source: PlatformId,
        lead_id: impl Into<String>,
        username: impl Into<String>,
        profile_url: impl Into<String>,
    ) -> Self {
        let username = username.into();
        Self {
            lead_id: lead_id.into(),
            source,
            name: username.clone(),
            username,
            profile_url: profile_url.into(),
            avatar_url: String::new(),
            bio: String::new(),
            company: String::new(),
            location: String::new(),
            email: String::new(),
            website: String::new(),
            social_links: HashMap::new(),
            metadata: HashMap::new(),
            lead_score: 0,
        }
    }

    /// Key used for deduplication: email, then profile URL, then username.
    ///
    /// `None` means the lead cannot be deduplicated and must be discarded.
    pub fn identity_key(&self) -> Option<&str> {
        [&self.email, &self.profile_url, &self.username]
            .into_iter()
            .map(|field| field.as_str())
            .find(|field| !field.is_empty())
    }

    pub(crate) fn with_score(mut self, score: i64) -> Self {
        self.lead_score = clamp_score(score);
        self
    }
}

pub fn clamp_score(score: i64) -> u8 {
    score.clamp(0, MAX_LEAD_SCORE as i64) as u8
}

/// A lead as it is written to the output sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedLead {
    #[serde(flatten)]
    pub lead: Lead,
    /// Search keyword that produced the lead
    pub keyword: String,
    /// ISO-8601 capture time
    pub scraped_at: String,
}

impl ScrapedLead {
    pub fn capture(lead: Lead, keyword: &str) -> Self {
        Self {
            lead,
            keyword: keyword.to_string(),
            scraped_at: timestamp(),
        }
    }
}
