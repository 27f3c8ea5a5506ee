//! Calendar traversal: walk the visible months, open every available date and collect
//! the time labels behind each slot group tab.

pub mod site;

pub use site::SiteProfile;

use crate::browser::{BrowserError, Element, Page};
use crate::models::DateAvailability;
use crate::wait::{retry_once, Clock};
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::time::Duration;

/// Delays given to the page after each interaction, in milliseconds.
///
/// The widget re-renders asynchronously and exposes no completion signal, so each
/// interaction is followed by a fixed settle period.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Maximum wait for the calendar table after navigation
    pub initial_wait_ms: u64,
    /// After clicking a date
    pub date_settle_ms: u64,
    /// Before the single re-check when a date shows no slot groups
    pub slot_group_retry_ms: u64,
    /// Before the single re-lookup of a detached slot tab
    pub slot_relocate_retry_ms: u64,
    /// After clicking a slot group tab
    pub slot_settle_ms: u64,
    /// After clicking "change selection"
    pub change_selection_settle_ms: u64,
    /// After clicking "next month"
    pub next_month_settle_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            initial_wait_ms: 10_000,
            date_settle_ms: 2_000,
            slot_group_retry_ms: 2_000,
            slot_relocate_retry_ms: 1_000,
            slot_settle_ms: 2_000,
            change_selection_settle_ms: 2_000,
            next_month_settle_ms: 4_000,
        }
    }
}

impl Timings {
    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Calendar did not load: {0}")]
    CalendarNotLoaded(#[source] BrowserError),

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

/// Drives one scrape of the calendar through a [`Page`].
///
/// Interactions are strictly sequential and every delay goes through the injected
/// [`Clock`]. Results accumulate in page order and are only handed out when the whole
/// traversal succeeds.
pub struct CalendarScraper<P, C> {
    page: P,
    clock: C,
    site: SiteProfile,
    timings: Timings,
    results: Vec<DateAvailability>,
}

impl<P: Page, C: Clock> CalendarScraper<P, C> {
    pub fn new(page: P, clock: C, site: SiteProfile, timings: Timings) -> Self {
        Self {
            page,
            clock,
            site,
            timings,
            results: Vec::new(),
        }
    }

    /// Navigate to the calendar and walk it.
    pub fn run(mut self) -> Result<Vec<DateAvailability>, ScrapeError> {
        self.navigate()?;

        info!("Starting month processing...");
        self.process_months()?;
        info!(
            "Finished processing months: {} dates collected",
            self.results.len()
        );

        Ok(self.results)
    }

    fn navigate(&self) -> Result<(), ScrapeError> {
        info!("Navigating to {}", self.site.target_url);
        self.page.navigate(&self.site.target_url)?;

        self.page
            .wait_for(
                &self.site.calendar_table,
                Timings::ms(self.timings.initial_wait_ms),
            )
            .map_err(ScrapeError::CalendarNotLoaded)
    }

    /// Date identifiers of the first visible month panel that are not marked unavailable,
    /// in page order.
    pub fn extract_available_dates(&self) -> Result<Vec<String>, BrowserError> {
        let buttons = self
            .page
            .query_in(&self.site.visible_month, &self.site.day_button)?;

        Ok(buttons
            .into_iter()
            .filter(|button| {
                button.control.is_some()
                    && !button
                        .control_attr("aria-label")
                        .is_some_and(|label| label.contains(&self.site.unavailable_marker))
            })
            .filter_map(|button| {
                button
                    .attr(&self.site.date_id_attribute)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
            })
            .collect())
    }

    /// Time labels currently displayed for the selected slot group.
    pub fn extract_time_labels(&self) -> Result<Vec<String>, BrowserError> {
        self.page.read_text(&self.site.slot_time_labels)
    }

    /// Click through every slot group tab of the selected date and gather their time labels.
    fn click_event_times_and_extract(&self, date: &str) -> Result<Vec<String>, BrowserError> {
        info!("Extracting event times for date: {}", date);

        let groups = retry_once(
            &self.clock,
            Timings::ms(self.timings.slot_group_retry_ms),
            || {
                let groups = self.page.query(&self.site.slot_group_tabs)?;
                if groups.is_empty() {
                    debug!("No slot groups rendered for {}", date);
                }
                Ok::<_, BrowserError>(groups)
            },
        )?;

        if groups.is_empty() {
            warn!("No event times found for {} after retry", date);
            return Ok(Vec::new());
        }

        let mut times = Vec::new();
        for (index, group) in groups.iter().enumerate() {
            match self.collect_slot_group(index, &group.text) {
                Ok(Some(found)) => times.extend(found),
                Ok(None) => {}
                Err(e) => error!("Error clicking on time slot {}: {}", group.text, e),
            }
        }

        Ok(times)
    }

    /// Select the `index`-th slot group tab and read its times.
    ///
    /// Tabs are re-located by position because each click may re-render the whole list.
    /// Returns `None` when the tab has disappeared.
    fn collect_slot_group(
        &self,
        index: usize,
        first_label: &str,
    ) -> Result<Option<Vec<String>>, BrowserError> {
        let selector = &self.site.slot_group_tabs;
        let mut live = self.page.query(selector)?;
        if live.get(index).is_none() {
            warn!("Event time element detached, retrying click for {}...", first_label);
            self.clock
                .sleep(Timings::ms(self.timings.slot_relocate_retry_ms));
            live = self.page.query(selector)?;
        }

        let Some(tab) = live.get(index) else {
            warn!("Skipping {}, element still detached", first_label);
            return Ok(None);
        };
        let label = slot_label(tab, first_label);

        info!("Clicking event time slot: {}", label);
        self.page.click(selector, index)?;
        self.clock.sleep(Timings::ms(self.timings.slot_settle_ms));

        let times = self.extract_time_labels()?;
        info!("Found times for {}: {}", label, times.join(", "));

        Ok(Some(times))
    }

    /// Return to the date picker if the "change selection" control is shown.
    fn click_back_control(&self) -> Result<(), BrowserError> {
        if self.page.query(&self.site.change_selection)?.is_empty() {
            warn!("'Change selection' control not found, skipping");
            return Ok(());
        }

        debug!("Clicking 'change selection'");
        self.page.click(&self.site.change_selection, 0)?;
        self.clock
            .sleep(Timings::ms(self.timings.change_selection_settle_ms));
        Ok(())
    }

    fn process_months(&mut self) -> Result<(), BrowserError> {
        let mut month = 0;

        while month < self.site.max_months {
            info!("Checking month {} for available dates...", month + 1);
            let dates = self.extract_available_dates()?;
            if dates.is_empty() {
                info!("Available dates: none");
            } else {
                info!("Available dates: {}", dates.join(", "));
            }

            for date in &dates {
                self.process_date(date)?;
            }

            if month + 1 >= self.site.max_months {
                break;
            }

            if !self.advance_month()? {
                warn!("'Next month' control not found, ending");
                break;
            }
            month += 1;
        }

        Ok(())
    }

    fn process_date(&mut self, date: &str) -> Result<(), BrowserError> {
        let selector = self.site.date_button(date);
        if self.page.query(&selector)?.is_empty() {
            warn!("Button for {} not found", date);
            return Ok(());
        }

        info!("Clicking on available date: {}", date);
        self.page.click(&selector, 0)?;
        self.clock.sleep(Timings::ms(self.timings.date_settle_ms));

        let times = self.click_event_times_and_extract(date)?;
        self.results.push(DateAvailability::new(date, times));

        self.click_back_control()
    }

    /// Click "next month". Returns `false` when the control is absent.
    fn advance_month(&self) -> Result<bool, BrowserError> {
        if self.page.query(&self.site.next_month)?.is_empty() {
            return Ok(false);
        }

        info!("Moving to next month...");
        self.page.click(&self.site.next_month, 0)?;
        self.clock
            .sleep(Timings::ms(self.timings.next_month_settle_ms));
        Ok(true)
    }
}

/// Label of a re-located slot tab, falling back to the one read with the first listing
fn slot_label<'a>(tab: &'a Element, first_label: &'a str) -> &'a str {
    if tab.text.is_empty() {
        first_label
    } else {
        &tab.text
    }
}
