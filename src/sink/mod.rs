//! Destinations for finished scrape results.
//!
//! A sink stores one JSON document per run under a time-derived name and returns the
//! URL it can be fetched from.

pub mod fs;
pub mod gcs;

pub use fs::FsSink;
pub use gcs::GcsSink;

use crate::models::DateAvailability;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to encode results: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upload of {name} rejected with status {status}: {body}")]
    Upload {
        name: String,
        status: u16,
        body: String,
    },

    #[error("No storage credentials: {0}")]
    Credentials(String),

    #[error("Failed to write results: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist `records` and return the URL of the stored document.
    async fn save(&self, records: &[DateAvailability]) -> Result<String, SinkError>;
}

/// Object name for a run finished at `at`: `scraped_data_<unix millis>.json`
pub fn object_name(at: DateTime<Utc>) -> String {
    format!("scraped_data_{}.json", at.timestamp_millis())
}

/// Pretty-printed JSON document for `records`
pub fn encode(records: &[DateAvailability]) -> Result<Vec<u8>, SinkError> {
    Ok(serde_json::to_vec_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_object_name_uses_millis() {
        let at = Utc.timestamp_millis_opt(1_741_953_600_123).unwrap();
        assert_eq!(object_name(at), "scraped_data_1741953600123.json");
    }

    #[test]
    fn test_encode_is_indented() {
        let records = vec![DateAvailability::new("2025-03-14", vec!["09:00".into()])];
        let text = String::from_utf8(encode(&records).unwrap()).unwrap();
        assert!(text.starts_with("[\n  {\n    \"date\": \"2025-03-14\""));
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(&[]).unwrap(), b"[]");
    }
}
