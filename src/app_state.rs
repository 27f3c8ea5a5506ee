//! Application state for the Actix-web server
//!
//! `AppState` is wrapped in `web::Data` and shared by every handler. The calendar
//! source and the result sink are constructed once at startup and injected here.

use crate::metrics::MetricsTracker;
use crate::sink::ResultSink;
use crate::source::AvailabilitySource;
use std::sync::Arc;

pub struct AppState {
    /// Produces availability listings (a live browser scrape in production)
    pub source: Arc<dyn AvailabilitySource>,
    /// Where finished listings are published
    pub sink: Arc<dyn ResultSink>,
    /// Run statistics exposed at `/metrics`
    pub metrics: MetricsTracker,
}

impl AppState {
    pub fn new(source: Arc<dyn AvailabilitySource>, sink: Arc<dyn ResultSink>) -> Self {
        Self {
            source,
            sink,
            metrics: MetricsTracker::new(),
        }
    }
}
