use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;
use log::LevelFilter;

mod cli;
mod config;
mod core;
mod error;
mod fetch;
mod models;
mod pipeline;
mod platforms;
mod sink;
mod stats;
#[cfg(test)]
mod testing;
mod utils;

use crate::{
    cli::CliArgs,
    config::load_config,
    core::Crawler,
    fetch::HttpFetcher,
    pipeline::{LocationFilter, RunContext, build_plan},
    sink::build_sink,
};

async fn run() -> Result<()> {
    let args = CliArgs::parse();
    let config = load_config(&args)?;

    let plan = build_plan(
        &config.crawl.platforms,
        &config.crawl.keywords,
        &config.filters.locations,
    );
    if plan.is_empty() {
        bail!("Nothing to crawl, check crawl.platforms and crawl.keywords");
    }
    log::info!("Total URLs to crawl: {}", plan.len());

    let filter = LocationFilter::new(&config.filters.locations, &config.filters.exclude_locations);
    if filter.is_active() {
        log::info!(
            "Filtering locations, include: {:?}, exclude: {:?}",
            config.filters.locations,
            config.filters.exclude_locations
        );
    }

    let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
    let sink = build_sink(&config.output).await?;
    let context = RunContext::new(config.crawl.max_leads, filter, sink);

    let summary = Crawler::new(fetcher, context, &config.crawl).run(plan).await;

    log::info!(
        "Lead generation completed! Total leads: {} from {} requests",
        summary.emitted,
        summary.requests
    );
    for line in summary.stats.to_string().lines() {
        log::info!("{}", line);
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    log::info!("Starting lead crawler...");

    if let Err(e) = run().await {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
