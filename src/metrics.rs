//! Run statistics for the scrape endpoint
//!
//! Tracks success rates, durations, last errors and how much data each run produced

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeMetrics {
    pub total_runs: u64,
    pub successful_runs: u64,
    pub failed_runs: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub last_data_url: Option<String>,
    pub average_duration_ms: f64,
    pub total_duration_ms: u64,
    pub dates_collected: u64,
    pub time_labels_collected: u64,
    pub timeout_count: u64,
}

impl ScrapeMetrics {
    pub fn success_rate(&self) -> f64 {
        if self.total_runs == 0 {
            0.0
        } else {
            (self.successful_runs as f64 / self.total_runs as f64) * 100.0
        }
    }

    pub fn record_success(&mut self, duration: Duration, dates: usize, time_labels: usize, data_url: &str) {
        self.total_runs += 1;
        self.successful_runs += 1;
        self.last_success = Some(Utc::now());
        self.last_data_url = Some(data_url.to_string());
        self.dates_collected += dates as u64;
        self.time_labels_collected += time_labels as u64;

        self.total_duration_ms += duration.as_millis() as u64;
        self.average_duration_ms = self.total_duration_ms as f64 / self.successful_runs as f64;
    }

    pub fn record_failure(&mut self, error: String) {
        self.total_runs += 1;
        self.failed_runs += 1;
        self.last_failure = Some(Utc::now());

        if error.to_lowercase().contains("timeout") {
            self.timeout_count += 1;
        }
        self.last_error = Some(error);
    }
}

/// Process-wide metrics, shared by all handlers
#[derive(Debug, Default)]
pub struct MetricsTracker {
    metrics: Mutex<ScrapeMetrics>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScrapeMetrics> {
        self.metrics.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_success(&self, duration: Duration, dates: usize, time_labels: usize, data_url: &str) {
        let mut metrics = self.lock();
        metrics.record_success(duration, dates, time_labels, data_url);

        log::info!(
            "Scrape succeeded in {}ms - {} dates, {} time labels - Success rate: {:.2}%",
            duration.as_millis(),
            dates,
            time_labels,
            metrics.success_rate()
        );
    }

    pub fn record_failure(&self, error: String) {
        let mut metrics = self.lock();
        metrics.record_failure(error.clone());

        log::warn!(
            "Scrape failed - Error: {} - Success rate: {:.2}%",
            error,
            metrics.success_rate()
        );
    }

    pub fn snapshot(&self) -> ScrapeMetrics {
        self.lock().clone()
    }
}

/// Time a scrape run and record the outcome
pub async fn track_run<F, E>(tracker: &MetricsTracker, operation: F) -> Result<RunSummary, E>
where
    F: std::future::Future<Output = Result<RunSummary, E>>,
    E: std::fmt::Display,
{
    let start = Instant::now();
    let result = operation.await;
    let duration = start.elapsed();

    match &result {
        Ok(summary) => tracker.record_success(
            duration,
            summary.dates,
            summary.time_labels,
            &summary.data_url,
        ),
        Err(e) => tracker.record_failure(e.to_string()),
    }

    result
}

/// What a successful run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub data_url: String,
    pub dates: usize,
    pub time_labels: usize,
}
