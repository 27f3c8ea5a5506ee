//! Browser automation for the calendar widget
//!
//! The scraper only ever sees the [`Page`] trait. [`ChromePage`] drives a real headless
//! Chrome tab; tests substitute a scripted page model.
//!
//! # Example
//!
//! ```no_run
//! use ticket_calendar_scraper::browser::{BrowserConfig, BrowserManager, ChromePage, Page};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = BrowserManager::new(BrowserConfig::default())?;
//! let page = ChromePage::new(manager.new_tab()?);
//!
//! page.navigate("https://example.com")?;
//! page.wait_for("h1", Duration::from_secs(10))?;
//! println!("{:?}", page.read_text("h1")?);
//! # Ok(())
//! # }
//! ```

pub mod chrome_page;
pub mod config;
pub mod manager;
pub mod page;

pub use chrome_page::ChromePage;
pub use config::BrowserConfig;
pub use manager::{BrowserError, BrowserManager};
pub use page::{Element, Page};
