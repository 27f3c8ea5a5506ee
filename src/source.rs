use crate::browser::{BrowserConfig, BrowserManager, ChromePage};
use crate::calendar::{CalendarScraper, ScrapeError, SiteProfile, Timings};
use crate::models::DateAvailability;
use crate::wait::SystemClock;

/// Something that can produce one full availability listing.
///
/// Implementations block; callers run them off the async executor.
pub trait AvailabilitySource: Send + Sync {
    fn collect(&self) -> Result<Vec<DateAvailability>, ScrapeError>;
}

/// Scrapes the live calendar with a fresh headless Chrome per run
#[derive(Debug, Clone)]
pub struct ChromeCalendarSource {
    pub browser: BrowserConfig,
    pub site: SiteProfile,
    pub timings: Timings,
}

impl ChromeCalendarSource {
    pub fn new(browser: BrowserConfig, site: SiteProfile, timings: Timings) -> Self {
        Self {
            browser,
            site,
            timings,
        }
    }
}

impl AvailabilitySource for ChromeCalendarSource {
    fn collect(&self) -> Result<Vec<DateAvailability>, ScrapeError> {
        // The manager owns the Chrome process and closes it when dropped, on every path out
        // of this function.
        let manager = BrowserManager::new(self.browser.clone())?;
        let page = ChromePage::new(manager.new_tab()?);

        CalendarScraper::new(page, SystemClock, self.site.clone(), self.timings.clone()).run()
    }
}
