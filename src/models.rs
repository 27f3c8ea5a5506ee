use serde::{Deserialize, Serialize};

/// Time slots offered for one calendar date.
///
/// `date` is the site's own identifier (the `data-date-id` attribute), not a parsed date.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DateAvailability {
    pub date: String,
    pub times: Vec<String>,
}

impl DateAvailability {
    pub fn new(date: impl Into<String>, times: Vec<String>) -> Self {
        Self {
            date: date.into(),
            times,
        }
    }
}

/// Body of the 202 response.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeAccepted {
    pub success: bool,
    pub message: String,
    pub data_url: String,
}

impl ScrapeAccepted {
    pub fn new(data_url: String) -> Self {
        Self {
            success: true,
            message: "Data processing started".to_string(),
            data_url,
        }
    }
}

/// Body of the 500 response.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScrapeFailed {
    pub success: bool,
    pub error: String,
}

impl ScrapeFailed {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
