use crate::browser::BrowserConfig;
use crate::calendar::{SiteProfile, Timings};
use crate::sink::{FsSink, GcsSink, ResultSink};
use crate::source::ChromeCalendarSource;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default)]
    pub site: SiteProfile,
    #[serde(default)]
    pub timings: Timings,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Gcs,
    Fs,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_kind")]
    pub kind: StorageKind,

    /// Bucket receiving the result documents
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Host used in the returned public URL
    #[serde(default = "default_public_host")]
    pub public_host: String,

    /// Base URL of the storage JSON API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Static bearer token; the metadata server is asked when unset
    #[serde(default)]
    pub access_token: Option<String>,

    /// Target directory when `kind = "fs"`
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_bind_addr() -> String { "0.0.0.0:8080".to_string() }
fn default_storage_kind() -> StorageKind { StorageKind::Gcs }
fn default_bucket() -> String { "safa-ava".to_string() }
fn default_public_host() -> String { "storage.googleapis.com".to_string() }
fn default_api_base() -> String { "https://storage.googleapis.com".to_string() }
fn default_output_dir() -> String { "scraped".to_string() }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: default_storage_kind(),
            bucket: default_bucket(),
            public_host: default_public_host(),
            api_base: default_api_base(),
            access_token: None,
            output_dir: default_output_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            site: SiteProfile::default(),
            timings: Timings::default(),
            browser: BrowserConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, then apply environment overrides
    pub fn load() -> Self {
        let mut config = Self::load_from(Path::new("config.toml"));
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Read a config file, falling back to defaults when it is missing or invalid
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Config>(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    log::warn!("Ignoring invalid {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Override settings from `PORT`, `GCS_BUCKET` and `GCS_ACCESS_TOKEN`
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(port) = var("PORT").filter(|p| p.parse::<u16>().is_ok()) {
            let host = self
                .bind_addr
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            self.bind_addr = format!("{}:{}", host, port);
        }
        if let Some(bucket) = var("GCS_BUCKET") {
            self.storage.bucket = bucket;
        }
        if let Some(token) = var("GCS_ACCESS_TOKEN") {
            self.storage.access_token = Some(token);
        }
    }

    /// Create the live calendar source from this configuration
    pub fn create_source(&self) -> ChromeCalendarSource {
        ChromeCalendarSource::new(
            self.browser.clone(),
            self.site.clone(),
            self.timings.clone(),
        )
    }
}

impl StorageConfig {
    /// Create the result sink from this configuration
    pub fn create_sink(&self) -> Arc<dyn ResultSink> {
        match self.kind {
            StorageKind::Gcs => Arc::new(GcsSink::new(
                self.bucket.clone(),
                self.public_host.clone(),
                self.api_base.clone(),
                self.access_token.clone(),
            )),
            StorageKind::Fs => Arc::new(FsSink::new(self.output_dir.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_original_target() {
        let config = Config::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.storage.kind, StorageKind::Gcs);
        assert_eq!(config.storage.bucket, "safa-ava");
        assert_eq!(config.site.max_months, 2);
        assert!(config.site.target_url.contains("sagradafamilia"));
    }

    #[test]
    fn test_parse_partial_file() {
        let config: Config = toml::from_str(
            r#"
            bind_addr = "127.0.0.1:3000"

            [storage]
            kind = "fs"
            output_dir = "/tmp/out"

            [timings]
            date_settle_ms = 500

            [browser]
            headless = false
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.storage.kind, StorageKind::Fs);
        assert_eq!(config.storage.output_dir, "/tmp/out");
        assert_eq!(config.storage.bucket, "safa-ava");
        assert_eq!(config.timings.date_settle_ms, 500);
        assert_eq!(config.timings.slot_settle_ms, 2_000);
        assert!(!config.browser.headless);
        assert_eq!(config.browser.window_size, (1500, 1300));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PORT", "9090"),
            ("GCS_BUCKET", "other-bucket"),
            ("GCS_ACCESS_TOKEN", "secret"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.bind_addr, "0.0.0.0:9090");
        assert_eq!(config.storage.bucket, "other-bucket");
        assert_eq!(config.storage.access_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_invalid_port_is_ignored() {
        let mut config = Config::default();
        config.apply_env(|key| (key == "PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }
}
