use serde::Deserialize;

/// Everything the scraper knows about the target page's markup.
///
/// The calendar is a third-party widget; when its markup changes, these are the values
/// to update in `config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// Ticket page hosting the calendar
    pub target_url: String,

    /// Calendar table; its presence means the widget has rendered
    pub calendar_table: String,

    /// Month panels on screen. The widget can show several side by side; only the
    /// first one is read per iteration.
    pub visible_month: String,

    /// Day buttons inside a month panel; combined with `date_id_attribute` to find one date
    pub day_button: String,

    /// Attribute carrying the site's date identifier
    pub date_id_attribute: String,

    /// Substring of the day's `aria-label` marking it as sold out or closed
    pub unavailable_marker: String,

    /// Time-slot group tabs shown after a date is selected
    pub slot_group_tabs: String,

    /// Time labels shown after a slot group is selected
    pub slot_time_labels: String,

    /// "Change selection" control returning to the date picker
    pub change_selection: String,

    /// "Next month" control
    pub next_month: String,

    /// Number of months to walk, the visible one included
    pub max_months: usize,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            target_url: "https://tickets.sagradafamilia.org/ca/1-individual/4375-sagrada-familia"
                .to_string(),
            calendar_table: "table.CalendarMonth_table.CalendarMonth_table_1".to_string(),
            visible_month: r#".CalendarMonth[data-visible="true"]"#.to_string(),
            day_button: ".CalendarDay_button".to_string(),
            date_id_attribute: "data-date-id".to_string(),
            unavailable_marker: "Not available".to_string(),
            slot_group_tabs: ".event-group-tabs .event-selector .event .date".to_string(),
            slot_time_labels: ".events-tabs .event-selector .event .date span".to_string(),
            change_selection: r#"div.edit.clickable.border-round[title="Canviar"]"#.to_string(),
            next_month:
                r#"div[role="button"][aria-label="Move forward to switch to the next month."]"#
                    .to_string(),
            max_months: 2,
        }
    }
}

impl SiteProfile {
    /// Selector for the day button of one date
    pub fn date_button(&self, date_id: &str) -> String {
        format!(
            r#"{}[{}="{}"]"#,
            self.day_button,
            self.date_id_attribute,
            escape_attribute_value(date_id)
        )
    }
}

/// Escape a value for use inside a double-quoted CSS attribute selector
fn escape_attribute_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
