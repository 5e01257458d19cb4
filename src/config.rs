use std::path::PathBuf;

use anyhow::{Result, bail};
use figment::{
    Figment,
    providers::{Format, Json, Serialized, Toml, Yaml},
};
use normalize_path::NormalizePath;
use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::cli::CliArgs;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub filters: FilterConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CrawlConfig {
    /// Platform identifiers, unknown ones are skipped
    pub platforms: Vec<String>,
    pub keywords: Vec<String>,
    /// Global cap on emitted leads
    pub max_leads: usize,
    /// Requests in flight at once
    pub max_concurrency: usize,
    /// Extra attempts for a failed fetch
    pub max_retries: u32,
    /// Base delay between attempts, grows linearly
    pub retry_backoff_ms: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FilterConfig {
    pub locations: Vec<String>,
    pub exclude_locations: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    /// How long a rendered page may take to show its expected structure
    pub wait_timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
    pub proxy: Option<String>,
    /// Browserless-compatible endpoint for pages that need rendering
    pub render_url: Option<String>,
    pub render_token: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    /// JSON lines dataset
    pub path: PathBuf,
    pub redis: RedisConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RedisConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    /// List the leads are pushed onto
    pub key: String,
    /// Expiry of the list in seconds
    pub expiry: Option<u64>,
}

pub(crate) fn defaults() -> Value {
    json!({
        "crawl": {
            "platforms": ["github", "devto", "reddit", "hackernews"],
            "keywords": ["startup", "founder", "developer"],
            "max_leads": 500,
            "max_concurrency": 2,
            "max_retries": 2,
            "retry_backoff_ms": 1000
        },
        "filters": {
            "locations": [],
            "exclude_locations": []
        },
        "fetch": {
            "timeout_secs": 30,
            "wait_timeout_secs": 10,
            "user_agent": "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36",
            "accept_language": "en-US,en;q=0.9"
        },
        "output": {
            "path": "./storage/leads.jsonl",
            "redis": {
                "enabled": false,
                "host": "127.0.0.1",
                "port": 6379,
                "key": "leads"
            }
        }
    })
}

impl Config {
    fn validate(&self) -> Result<()> {
        if self.crawl.max_leads == 0 {
            bail!("crawl.max_leads must be at least 1");
        }
        if self.crawl.max_concurrency == 0 {
            bail!("crawl.max_concurrency must be at least 1");
        }
        if self.fetch.timeout_secs == 0 {
            bail!("fetch.timeout_secs must be at least 1");
        }
        Ok(())
    }
}

fn build(figment: Figment) -> Result<Config> {
    let mut config: Config = figment.extract()?;
    config.output.path = config.output.path.resolve().normalize();
    config.validate()?;
    Ok(config)
}

/// Defaults, then the config file, then CLI arguments and environment.
pub fn load_config(args: &CliArgs) -> Result<Config> {
    let mut figment = Figment::new().merge(Serialized::defaults(defaults()));

    let config_path = PathBuf::from(
        args.config
            .clone()
            .unwrap_or(DEFAULT_CONFIG_PATH.to_string()),
    );

    if config_path.exists() {
        log::info!("Config file found: {}", config_path.display());
        figment = match config_path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => figment.merge(Toml::file(&config_path)),
            Some("json") => figment.merge(Json::file(&config_path)),
            Some("yaml") | Some("yml") => figment.merge(Yaml::file(&config_path)),
            _ => bail!("Cannot identify config file type. Must be .toml, .json or .yaml"),
        };
    } else if config_path.to_str() != Some(DEFAULT_CONFIG_PATH) {
        bail!("Config file not found: {}", config_path.display());
    }

    let config = build(figment.merge(Serialized::defaults(args.overrides())))?;
    log::debug!("Loaded config: {:#?}", config);

    Ok(config)
}
