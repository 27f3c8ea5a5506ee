//! Scripted model of the ticketing calendar for driving the scraper without a browser

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;
use ticket_calendar_scraper::browser::{BrowserError, Element, Page};
use ticket_calendar_scraper::calendar::SiteProfile;

#[derive(Debug, Clone)]
pub struct FakeSlotGroup {
    pub label: String,
    pub times: Vec<String>,
    pub fail_click: bool,
}

impl FakeSlotGroup {
    pub fn new(label: &str, times: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            times: times.iter().map(|t| t.to_string()).collect(),
            fail_click: false,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail_click = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct FakeDate {
    pub id: String,
    pub available: bool,
    pub has_button: bool,
    pub groups: Vec<FakeSlotGroup>,
    /// Number of slot group tabs returned by successive queries once this date is
    /// selected; the full list is returned when the plan runs out.
    pub group_plan: Vec<usize>,
}

impl FakeDate {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            available: true,
            has_button: true,
            groups: Vec::new(),
            group_plan: Vec::new(),
        }
    }

    pub fn with_groups(mut self, groups: Vec<FakeSlotGroup>) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_group_plan(mut self, plan: &[usize]) -> Self {
        self.group_plan = plan.to_vec();
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn without_button(mut self) -> Self {
        self.has_button = false;
        self
    }
}

#[derive(Debug, Clone)]
pub struct FakeCalendar {
    pub months: Vec<Vec<FakeDate>>,
    pub loads: bool,
    pub has_next_month: bool,
    pub has_change_selection: bool,
    /// Month panels shown side by side; "next" shifts the window by one month
    pub visible_months: usize,
}

impl FakeCalendar {
    pub fn new(months: Vec<Vec<FakeDate>>) -> Self {
        Self {
            months,
            loads: true,
            has_next_month: true,
            has_change_selection: true,
            visible_months: 1,
        }
    }

    pub fn with_visible_months(mut self, count: usize) -> Self {
        self.visible_months = count;
        self
    }
}

#[derive(Debug, Default)]
struct PageState {
    month: usize,
    /// Selected date as (month, position)
    date: Option<(usize, usize)>,
    group: Option<usize>,
    plan: VecDeque<usize>,
    clicks: Vec<String>,
    navigations: Vec<String>,
}

pub struct FakePage {
    calendar: FakeCalendar,
    site: SiteProfile,
    state: RefCell<PageState>,
}

impl FakePage {
    pub fn new(calendar: FakeCalendar) -> Self {
        Self {
            calendar,
            site: SiteProfile::default(),
            state: RefCell::new(PageState::default()),
        }
    }

    /// Every click performed, e.g. `date:2025-03-14`, `group:0`, `back`, `next`
    pub fn clicks(&self) -> Vec<String> {
        self.state.borrow().clicks.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.borrow().navigations.clone()
    }

    fn selected_date(&self) -> Option<&FakeDate> {
        let (month, index) = self.state.borrow().date?;
        self.calendar.months.get(month)?.get(index)
    }

    /// Months currently rendered as visible panels
    fn visible_panels(&self) -> &[Vec<FakeDate>] {
        let first = self.state.borrow().month.min(self.calendar.months.len());
        let last = (first + self.calendar.visible_months).min(self.calendar.months.len());
        &self.calendar.months[first..last]
    }

    /// (month, position) of the button for `id` among the visible panels
    fn find_date(&self, id: &str) -> Option<(usize, usize)> {
        let first = self.state.borrow().month;
        self.visible_panels()
            .iter()
            .enumerate()
            .find_map(|(offset, month)| {
                month
                    .iter()
                    .position(|d| d.id == id && d.has_button)
                    .map(|position| (first + offset, position))
            })
    }

    fn date_id_from_selector(&self, selector: &str) -> Option<String> {
        let rest = selector.strip_prefix(&self.site.day_button)?;
        let start = rest.find("=\"")? + 2;
        let end = rest.rfind("\"]")?;
        Some(rest[start..end].to_string())
    }

    fn day_buttons(month: &[FakeDate]) -> Vec<Element> {
        month
            .iter()
            .map(|date| {
                let label = if date.available {
                    format!("Choose {} as your date", date.id)
                } else {
                    format!("Not available. {}", date.id)
                };
                Element {
                    text: date.id.clone(),
                    attributes: attrs(&[("data-date-id", &date.id)]),
                    control: Some(attrs(&[("role", "button"), ("aria-label", &label)])),
                }
            })
            .collect()
    }

    fn slot_groups(&self) -> Vec<Element> {
        let Some(date) = self.selected_date() else {
            return Vec::new();
        };
        let visible = self
            .state
            .borrow_mut()
            .plan
            .pop_front()
            .unwrap_or(date.groups.len());

        date.groups
            .iter()
            .take(visible)
            .map(|group| Element {
                text: group.label.clone(),
                ..Element::default()
            })
            .collect()
    }

    fn time_labels(&self) -> Vec<Element> {
        let Some(date) = self.selected_date() else {
            return Vec::new();
        };
        let Some(group) = self.state.borrow().group.and_then(|g| date.groups.get(g)) else {
            return Vec::new();
        };

        group
            .times
            .iter()
            .map(|time| Element {
                text: time.clone(),
                ..Element::default()
            })
            .collect()
    }
}

impl Page for FakePage {
    fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.state.borrow_mut().navigations.push(url.to_string());
        Ok(())
    }

    fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<(), BrowserError> {
        if selector == self.site.calendar_table && self.calendar.loads {
            Ok(())
        } else {
            Err(BrowserError::Timeout(selector.to_string()))
        }
    }

    fn query(&self, selector: &str) -> Result<Vec<Element>, BrowserError> {
        let site = &self.site;

        if selector == site.visible_month {
            return Ok(vec![Element::default(); self.visible_panels().len()]);
        }
        if selector == format!("{} {}", site.visible_month, site.day_button) {
            return Ok(self
                .visible_panels()
                .iter()
                .flat_map(|month| Self::day_buttons(month))
                .collect());
        }
        if selector == site.slot_group_tabs {
            return Ok(self.slot_groups());
        }
        if selector == site.slot_time_labels {
            return Ok(self.time_labels());
        }
        if selector == site.change_selection {
            let shown = self.calendar.has_change_selection && self.state.borrow().date.is_some();
            return Ok(if shown { vec![Element::default()] } else { Vec::new() });
        }
        if selector == site.next_month {
            return Ok(if self.calendar.has_next_month {
                vec![Element::default()]
            } else {
                Vec::new()
            });
        }
        if let Some(id) = self.date_id_from_selector(selector) {
            let found = self.find_date(&id).is_some();
            return Ok(if found { vec![Element::default()] } else { Vec::new() });
        }

        Ok(Vec::new())
    }

    fn query_in(&self, scope: &str, selector: &str) -> Result<Vec<Element>, BrowserError> {
        if scope == self.site.visible_month && selector == self.site.day_button {
            return Ok(self
                .visible_panels()
                .first()
                .map(|month| Self::day_buttons(month))
                .unwrap_or_default());
        }
        Ok(Vec::new())
    }

    fn click(&self, selector: &str, index: usize) -> Result<(), BrowserError> {
        let site = &self.site;

        if selector == site.slot_group_tabs {
            let group = self
                .selected_date()
                .and_then(|date| date.groups.get(index))
                .cloned()
                .ok_or_else(|| BrowserError::ElementNotFound(selector.to_string()))?;
            if group.fail_click {
                return Err(BrowserError::ClickError(format!("{} is not clickable", group.label)));
            }
            let mut state = self.state.borrow_mut();
            state.group = Some(index);
            state.clicks.push(format!("group:{}", index));
            return Ok(());
        }
        if selector == site.change_selection {
            let mut state = self.state.borrow_mut();
            state.date = None;
            state.group = None;
            state.clicks.push("back".to_string());
            return Ok(());
        }
        if selector == site.next_month {
            let mut state = self.state.borrow_mut();
            state.month += 1;
            state.date = None;
            state.group = None;
            state.clicks.push("next".to_string());
            return Ok(());
        }
        if let Some(id) = self.date_id_from_selector(selector) {
            let (month, position) = self
                .find_date(&id)
                .ok_or_else(|| BrowserError::ElementNotFound(selector.to_string()))?;
            let plan = self.calendar.months[month][position].group_plan.clone();

            let mut state = self.state.borrow_mut();
            state.date = Some((month, position));
            state.group = None;
            state.plan = plan.into();
            state.clicks.push(format!("date:{}", id));
            return Ok(());
        }

        Err(BrowserError::ElementNotFound(selector.to_string()))
    }
}

fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
