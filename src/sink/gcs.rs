use super::{encode, object_name, ResultSink, SinkError};
use crate::models::DateAvailability;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Uploads results to a Google Cloud Storage bucket through the JSON API.
///
/// Without an explicit access token the sink asks the GCE metadata server, which is
/// what Cloud Run and Cloud Functions provide.
#[derive(Debug, Clone)]
pub struct GcsSink {
    client: Client,
    bucket: String,
    public_host: String,
    api_base: String,
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
}

impl GcsSink {
    pub fn new(
        bucket: impl Into<String>,
        public_host: impl Into<String>,
        api_base: impl Into<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            bucket: bucket.into(),
            public_host: public_host.into(),
            api_base: api_base.into(),
            access_token,
        }
    }

    /// `https://<public_host>/<bucket>/<name>`
    pub fn public_url(&self, name: &str) -> String {
        format!("https://{}/{}/{}", self.public_host, self.bucket, name)
    }

    async fn token(&self) -> Result<String, SinkError> {
        if let Some(token) = &self.access_token {
            return Ok(token.clone());
        }

        log::debug!("Fetching access token from metadata server");
        let response = self
            .client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| SinkError::Credentials(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SinkError::Credentials(format!(
                "metadata server returned {}",
                response.status()
            )));
        }

        let token: MetadataToken = response
            .json()
            .await
            .map_err(|e| SinkError::Credentials(e.to_string()))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl ResultSink for GcsSink {
    async fn save(&self, records: &[DateAvailability]) -> Result<String, SinkError> {
        let name = object_name(Utc::now());
        let body = encode(records)?;
        let token = self.token().await?;

        let url = format!(
            "{}/upload/storage/v1/b/{}/o",
            self.api_base.trim_end_matches('/'),
            self.bucket
        );
        let response = self
            .client
            .post(&url)
            .query(&[("uploadType", "media"), ("name", name.as_str())])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Upload {
                name,
                status: status.as_u16(),
                body,
            });
        }

        log::info!("Data saved to Cloud Storage: {}", name);
        Ok(self.public_url(&name))
    }
}
