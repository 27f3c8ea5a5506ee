use super::manager::BrowserError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Snapshot of one DOM element taken at query time.
///
/// Snapshots never go stale on their own: to act on an element again, query the page
/// again and address it by selector and index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Element {
    /// Trimmed `innerText`
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    /// Attributes of the nearest `[role="button"]` element, the element itself included.
    /// `None` when the element is not inside an ARIA button.
    #[serde(default)]
    pub control: Option<BTreeMap<String, String>>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn control_attr(&self, name: &str) -> Option<&str> {
        self.control
            .as_ref()
            .and_then(|attrs| attrs.get(name))
            .map(String::as_str)
    }
}

/// A remote-controlled page.
///
/// Elements are addressed by CSS selector plus position in document order, which lets
/// callers re-locate elements that the page has replaced since the last query.
pub trait Page {
    fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Block until `selector` matches, failing with [`BrowserError::Timeout`] after `timeout`.
    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// All live matches of `selector`, in document order.
    fn query(&self, selector: &str) -> Result<Vec<Element>, BrowserError>;

    /// Live matches of `selector` inside the first element matching `scope`, in document
    /// order. Empty when nothing matches `scope`.
    fn query_in(&self, scope: &str, selector: &str) -> Result<Vec<Element>, BrowserError>;

    /// Click the `index`-th live match of `selector`.
    fn click(&self, selector: &str, index: usize) -> Result<(), BrowserError>;

    /// Trimmed text of every live match of `selector`.
    fn read_text(&self, selector: &str) -> Result<Vec<String>, BrowserError> {
        Ok(self
            .query(selector)?
            .into_iter()
            .map(|element| element.text)
            .collect())
    }
}

impl<P: Page + ?Sized> Page for &P {
    fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        (**self).navigate(url)
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        (**self).wait_for(selector, timeout)
    }

    fn query(&self, selector: &str) -> Result<Vec<Element>, BrowserError> {
        (**self).query(selector)
    }

    fn query_in(&self, scope: &str, selector: &str) -> Result<Vec<Element>, BrowserError> {
        (**self).query_in(scope, selector)
    }

    fn click(&self, selector: &str, index: usize) -> Result<(), BrowserError> {
        (**self).click(selector, index)
    }

    fn read_text(&self, selector: &str) -> Result<Vec<String>, BrowserError> {
        (**self).read_text(selector)
    }
}
