use std::time::Duration;

use futures::{StreamExt, future, stream};

use crate::{
    config::CrawlConfig,
    error::CrawlError,
    fetch::SharedFetcher,
    models::{FetchedContent, SearchRequest},
    pipeline::RunContext,
    platforms,
    stats::RunStats,
};

#[derive(Debug)]
pub struct RunSummary {
    /// Leads that reached the sink
    pub emitted: usize,
    /// Requests that were actually sent, skipped ones excluded
    pub requests: usize,
    pub stats: RunStats,
}

/// Runs a request plan through fetch, extraction and intake with bounded concurrency.
pub struct Crawler {
    fetcher: SharedFetcher,
    context: RunContext,
    stats: RunStats,
    max_concurrency: usize,
    max_retries: u32,
    retry_backoff: Duration,
}

impl Crawler {
    pub fn new(fetcher: SharedFetcher, context: RunContext, config: &CrawlConfig) -> Self {
        Self {
            fetcher,
            context,
            stats: RunStats::default(),
            max_concurrency: config.max_concurrency.max(1),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    pub async fn run(self, plan: Vec<SearchRequest>) -> RunSummary {
        log::info!(
            "Crawling {} requests, {} at a time, up to {} leads",
            plan.len(),
            self.max_concurrency,
            self.context.max_leads()
        );

        let requests = stream::iter(plan)
            .map(|request| self.process(request))
            .buffer_unordered(self.max_concurrency)
            .filter(|sent| future::ready(*sent))
            .count()
            .await;

        log::debug!("{} unique identities seen", self.context.seen().await);

        RunSummary {
            emitted: self.context.emitted().await,
            requests,
            stats: self.stats,
        }
    }

    /// One unit of work. Returns whether the request was sent.
    async fn process(&self, request: SearchRequest) -> bool {
        let platform = request.platform();

        if self.context.is_saturated().await {
            log::debug!("Max leads reached, skipping {}", request.url());
            return false;
        }

        self.stats.record_request(platform);
        let content = match self.fetch_with_retry(&request).await {
            Ok(content) => content,
            Err(e) => {
                self.stats.record_failure(platform);
                log::error!("Giving up on {}: {}", request.url(), e);
                return true;
            }
        };

        // another request may have filled the cap while this one was in flight
        if self.context.is_saturated().await {
            log::debug!("Max leads reached, discarding {}", request.url());
            return true;
        }

        let leads = match platforms::lookup(platform).harvest(&content) {
            Ok(leads) => leads,
            Err(e) => {
                self.stats.record_failure(platform);
                log::warn!("No leads from {}: {}", request.url(), e);
                return true;
            }
        };

        let extracted = leads.len();
        let accepted = self.context.intake(leads, request.keyword()).await;
        self.stats.record_yield(platform, extracted, accepted);

        log::info!(
            "{} {:?}: {} extracted, {} accepted, {} total",
            platform,
            request.keyword(),
            extracted,
            accepted,
            self.context.emitted().await
        );

        true
    }

    async fn fetch_with_retry(&self, request: &SearchRequest) -> Result<FetchedContent, CrawlError> {
        let mut attempt = 0;

        loop {
            match self.fetcher.fetch(request).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.retry_backoff * attempt;
                    log::warn!(
                        "{} (retry {}/{} in {:?})",
                        e,
                        attempt,
                        self.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
