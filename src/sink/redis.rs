use anyhow::{Error, Result};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager, cmd};

use crate::{
    config::RedisConfig,
    error::CrawlError,
    models::ScrapedLead,
    sink::{LeadSink, encode},
};

/// Pushes serialized leads onto a redis list.
pub struct RedisSink {
    conn_manager: ConnectionManager,
    key: String,
    expiry: Option<u64>,
}

impl RedisSink {
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(format!("redis://{}:{}", config.host, config.port))
            .map_err(|e| Error::msg(format!("Failed to create a redis client: {}", e)))?;

        let conn_manager = client
            .get_connection_manager()
            .await
            .map_err(|e| Error::msg(format!("Failed to connect to redis: {}", e)))?;

        Ok(Self {
            conn_manager,
            key: config.key.clone(),
            expiry: config.expiry,
        })
    }
}

#[async_trait]
impl LeadSink for RedisSink {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn push(&self, record: &ScrapedLead) -> Result<(), CrawlError> {
        let payload = encode(record)?;
        let mut connection = self.conn_manager.clone();

        connection
            .rpush::<_, _, ()>(&self.key, payload)
            .await
            .map_err(|e| CrawlError::Sink(e.to_string()))?;

        if let Some(expiry) = self.expiry {
            let mut expire_cmd = cmd("EXPIRE");
            expire_cmd.arg(&self.key).arg(expiry);
            if let Err(e) = expire_cmd.query_async::<()>(&mut connection).await {
                log::warn!("Failed to set expiry on {}: {}", self.key, e);
            }
        }

        Ok(())
    }
}
