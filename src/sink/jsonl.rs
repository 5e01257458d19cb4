use std::path::Path;

use async_trait::async_trait;
use tokio::{
    fs::{self, File, OpenOptions},
    io::{AsyncWriteExt, BufWriter},
    sync::Mutex,
};

use crate::{
    error::CrawlError,
    models::ScrapedLead,
    sink::{LeadSink, encode},
};

/// Appends one JSON object per line to a dataset file.
pub struct JsonLinesSink {
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesSink {
    pub async fn open(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

#[async_trait]
impl LeadSink for JsonLinesSink {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    async fn push(&self, record: &ScrapedLead) -> Result<(), CrawlError> {
        let mut line = encode(record)?;
        line.push('\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| CrawlError::Sink(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| CrawlError::Sink(e.to_string()))
    }
}
