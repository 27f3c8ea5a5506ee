use super::{encode, object_name, ResultSink, SinkError};
use crate::models::DateAvailability;
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;

/// Writes results into a local directory; for development runs without a bucket
#[derive(Debug, Clone)]
pub struct FsSink {
    dir: PathBuf,
}

impl FsSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ResultSink for FsSink {
    async fn save(&self, records: &[DateAvailability]) -> Result<String, SinkError> {
        let name = object_name(Utc::now());
        let body = encode(records)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = tokio::fs::canonicalize(&self.dir).await?.join(&name);
        tokio::fs::write(&path, body).await?;

        log::info!("Data saved to {}", path.display());
        Ok(format!("file://{}", path.display()))
    }
}
