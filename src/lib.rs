// Library interface for ticket_calendar_scraper
// The binary and the integration tests both build on these modules

pub mod app_state;
pub mod browser;
pub mod calendar;
pub mod config;
pub mod handlers;
pub mod job;
pub mod metrics;
pub mod models;
pub mod sink;
pub mod source;
pub mod wait;
