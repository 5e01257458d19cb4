use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::OutputConfig;
use crate::error::CrawlError;
use crate::models::ScrapedLead;

pub mod jsonl;
pub mod redis;

pub use jsonl::JsonLinesSink;
pub use redis::RedisSink;

/// Destination for accepted leads.
#[async_trait]
pub trait LeadSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn push(&self, record: &ScrapedLead) -> Result<(), CrawlError>;
}

pub(crate) type SharedSink = Arc<dyn LeadSink>;

/// Build the configured sink. Redis wins over the dataset file when enabled.
pub async fn build_sink(config: &OutputConfig) -> Result<SharedSink> {
    if config.redis.enabled {
        let sink = RedisSink::connect(&config.redis)
            .await
            .context("Failed to set up redis output")?;
        log::info!(
            "Writing leads to redis list {} on {}:{}",
            config.redis.key,
            config.redis.host,
            config.redis.port
        );
        return Ok(Arc::new(sink));
    }

    let sink = JsonLinesSink::open(&config.path)
        .await
        .with_context(|| format!("Failed to open dataset {}", config.path.display()))?;
    log::info!("Writing leads to {}", config.path.display());
    Ok(Arc::new(sink))
}

fn encode(record: &ScrapedLead) -> Result<String, CrawlError> {
    serde_json::to_string(record).map_err(|e| CrawlError::Sink(e.to_string()))
}
