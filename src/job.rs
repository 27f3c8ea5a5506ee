use crate::calendar::ScrapeError;
use crate::metrics::RunSummary;
use crate::sink::{ResultSink, SinkError};
use crate::source::AvailabilitySource;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("Scrape task aborted: {0}")]
    Aborted(String),
}

/// Scrape on a blocking thread, then persist the results.
///
/// Results are only handed to the sink after the scrape finished; a failed scrape
/// stores nothing.
pub async fn run_scrape_job(
    source: Arc<dyn AvailabilitySource>,
    sink: &dyn ResultSink,
) -> Result<RunSummary, JobError> {
    log::info!("Starting scrape...");
    let records = tokio::task::spawn_blocking(move || source.collect())
        .await
        .map_err(|e| JobError::Aborted(e.to_string()))??;

    let time_labels = records.iter().map(|r| r.times.len()).sum();
    let data_url = sink.save(&records).await?;

    Ok(RunSummary {
        data_url,
        dates: records.len(),
        time_labels,
    })
}
