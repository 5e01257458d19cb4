use clap::Parser;
use serde_json::{Map, Value};

#[derive(Parser, Debug, Default)]
#[command(version, about = "Collect leads from developer and founder communities")]
pub(crate) struct CliArgs {
    /// Platforms to search, comma separated (default: github,devto,reddit,hackernews)
    #[arg(short, long, env = "LEADS_PLATFORMS", value_delimiter = ',')]
    pub(crate) platforms: Option<Vec<String>>,

    /// Search keywords, comma separated (default: startup,founder,developer)
    #[arg(short, long, env = "LEADS_KEYWORDS", value_delimiter = ',')]
    pub(crate) keywords: Option<Vec<String>>,

    /// Stop after this many leads (default: 500)
    #[arg(short, long, env = "LEADS_MAX_LEADS")]
    pub(crate) max_leads: Option<usize>,

    /// Requests in flight at once (default: 2)
    #[arg(long, env = "LEADS_MAX_CONCURRENCY")]
    pub(crate) max_concurrency: Option<usize>,

    /// Retries per failed request (default: 2)
    #[arg(long, env = "LEADS_MAX_RETRIES")]
    pub(crate) max_retries: Option<u32>,

    /// Only keep leads whose location contains one of these, comma separated
    #[arg(short, long, env = "LEADS_LOCATIONS", value_delimiter = ',')]
    pub(crate) locations: Option<Vec<String>>,

    /// Drop leads whose location contains one of these, comma separated
    #[arg(long, env = "LEADS_EXCLUDE_LOCATIONS", value_delimiter = ',')]
    pub(crate) exclude_locations: Option<Vec<String>>,

    /// Request timeout in sec (default: 30)
    #[arg(long, env = "LEADS_TIMEOUT")]
    pub(crate) timeout: Option<u64>,

    /// Proxy URL for every request
    #[arg(long, env = "LEADS_PROXY")]
    pub(crate) proxy: Option<String>,

    /// Browserless base URL used to render dynamic pages
    #[arg(long, env = "LEADS_RENDER_URL")]
    pub(crate) render_url: Option<String>,

    /// Browserless API token
    #[arg(long, env = "LEADS_RENDER_TOKEN")]
    pub(crate) render_token: Option<String>,

    /// Output file (default: "./storage/leads.jsonl")
    #[arg(short, long, env = "LEADS_OUTPUT")]
    pub(crate) output: Option<String>,

    /// Push leads to redis instead of the output file
    #[arg(long, env = "LEADS_REDIS_ENABLED")]
    pub(crate) redis_enabled: Option<bool>,

    /// Redis Host
    #[arg(long, env = "LEADS_REDIS_HOST")]
    pub(crate) redis_host: Option<String>,

    /// Redis Port
    #[arg(long, env = "LEADS_REDIS_PORT")]
    pub(crate) redis_port: Option<u16>,

    /// Redis list key (default: "leads")
    #[arg(long, env = "LEADS_REDIS_KEY")]
    pub(crate) redis_key: Option<String>,

    /// Config file path (default: "config.toml")
    #[arg(short, long, env = "LEADS_CONFIG")]
    pub(crate) config: Option<String>,
}

fn section(fields: Vec<(&str, Option<Value>)>) -> Option<Value> {
    let fields: Map<String, Value> = fields
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key.to_string(), value)))
        .collect();

    (!fields.is_empty()).then_some(Value::Object(fields))
}

impl CliArgs {
    /// Only the arguments that were given, nested like the config file.
    pub(crate) fn overrides(&self) -> Value {
        let redis = section(vec![
            ("enabled", self.redis_enabled.map(Value::from)),
            ("host", self.redis_host.clone().map(Value::from)),
            ("port", self.redis_port.map(Value::from)),
            ("key", self.redis_key.clone().map(Value::from)),
        ]);

        let sections = [
            (
                "crawl",
                section(vec![
                    ("platforms", self.platforms.clone().map(Value::from)),
                    ("keywords", self.keywords.clone().map(Value::from)),
                    ("max_leads", self.max_leads.map(Value::from)),
                    ("max_concurrency", self.max_concurrency.map(Value::from)),
                    ("max_retries", self.max_retries.map(Value::from)),
                ]),
            ),
            (
                "filters",
                section(vec![
                    ("locations", self.locations.clone().map(Value::from)),
                    (
                        "exclude_locations",
                        self.exclude_locations.clone().map(Value::from),
                    ),
                ]),
            ),
            (
                "fetch",
                section(vec![
                    ("timeout_secs", self.timeout.map(Value::from)),
                    ("proxy", self.proxy.clone().map(Value::from)),
                    ("render_url", self.render_url.clone().map(Value::from)),
                    ("render_token", self.render_token.clone().map(Value::from)),
                ]),
            ),
            (
                "output",
                section(vec![
                    ("path", self.output.clone().map(Value::from)),
                    ("redis", redis),
                ]),
            ),
        ];

        Value::Object(
            sections
                .into_iter()
                .filter_map(|(name, value)| value.map(|value| (name.to_string(), value)))
                .collect(),
        )
    }
}
