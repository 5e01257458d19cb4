//! In-process doubles for the fetch layer and the output sink.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{
    error::CrawlError,
    fetch::Fetcher,
    models::{FetchedContent, Lead, PlatformId, ScrapedLead, SearchRequest},
    sink::LeadSink,
};

#[derive(Default)]
pub(crate) struct MemorySink {
    records: Mutex<Vec<ScrapedLead>>,
    fail: bool,
}

impl MemorySink {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub(crate) fn records(&self) -> Vec<ScrapedLead> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl LeadSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn push(&self, record: &ScrapedLead) -> Result<(), CrawlError> {
        if self.fail {
            return Err(CrawlError::Sink("sink closed".to_string()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Serves canned responses keyed by platform. Responses are consumed front to back,
/// the last one repeats.
#[derive(Default)]
pub(crate) struct StaticFetcher {
    responses: Mutex<HashMap<PlatformId, Vec<Result<FetchedContent, String>>>>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub(crate) fn with(self, platform: PlatformId, content: FetchedContent) -> Self {
        self.push(platform, Ok(content))
    }

    pub(crate) fn failing(self, platform: PlatformId, message: &str) -> Self {
        self.push(platform, Err(message.to_string()))
    }

    fn push(self, platform: PlatformId, response: Result<FetchedContent, String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(platform)
            .or_default()
            .push(response);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, request: &SearchRequest) -> Result<FetchedContent, CrawlError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut responses = self.responses.lock().unwrap();
        let queue = responses.get_mut(&request.platform());
        let response = match queue {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Err(format!("no response for {}", request.platform())),
        };

        response.map_err(|message| CrawlError::Fetch {
            url: request.url().to_string(),
            message,
        })
    }
}

pub(crate) fn github_lead(id: u64, email: &str, location: &str) -> Lead {
    let username = format!("user{id}");
    let mut lead = Lead::new(
        PlatformId::Github,
        format!("github_{id}"),
        &username,
        format!("https://github.com/{username}"),
    );
    lead.email = email.to_string();
    lead.location = location.to_string();
    lead
}
