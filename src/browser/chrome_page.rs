use super::manager::BrowserError;
use super::page::{Element, Page};
use crate::wait::{poll_until, SystemClock};
use headless_chrome::Tab;
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// [`Page`] backed by a headless Chrome tab
pub struct ChromePage {
    tab: Arc<Tab>,
    clock: SystemClock,
}

impl ChromePage {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self {
            tab,
            clock: SystemClock,
        }
    }

    /// Evaluate a script that returns a string
    fn evaluate_string(&self, script: &str) -> Result<String, BrowserError> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        result
            .value
            .and_then(|v| v.as_str().map(|s| s.to_string()))
            .ok_or_else(|| BrowserError::JavaScriptError("Script returned no value".to_string()))
    }

    fn snapshot(&self, script: &str) -> Result<Vec<Element>, BrowserError> {
        let json = self.evaluate_string(script)?;
        serde_json::from_str(&json)
            .map_err(|e| BrowserError::JavaScriptError(format!("Bad element snapshot: {}", e)))
    }

    fn exists(&self, selector: &str) -> Result<bool, BrowserError> {
        let script = format!("document.querySelector({}) !== null", js_string(selector));
        let result = self
            .tab
            .evaluate(&script, false)
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;

        Ok(result.value.and_then(|v| v.as_bool()).unwrap_or(false))
    }
}

impl Page for ChromePage {
    fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.tab
            .navigate_to(url)
            .map_err(|e| BrowserError::NavigationError(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| BrowserError::NavigationError(format!("Navigation timeout for {}: {}", url, e)))?;

        Ok(())
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        // evaluation errors while the document is being replaced count as "not yet"
        let found = poll_until(&self.clock, timeout, POLL_INTERVAL, || {
            Ok::<_, BrowserError>(self.exists(selector).unwrap_or(false))
        })?;

        if found {
            Ok(())
        } else {
            Err(BrowserError::Timeout(selector.to_string()))
        }
    }

    fn query(&self, selector: &str) -> Result<Vec<Element>, BrowserError> {
        self.snapshot(&snapshot_script("document", selector))
    }

    fn query_in(&self, scope: &str, selector: &str) -> Result<Vec<Element>, BrowserError> {
        let root = format!("document.querySelector({})", js_string(scope));
        self.snapshot(&snapshot_script(&root, selector))
    }

    fn click(&self, selector: &str, index: usize) -> Result<(), BrowserError> {
        let elements = self
            .tab
            .find_elements(selector)
            .map_err(|_| BrowserError::ElementNotFound(selector.to_string()))?;

        let element = elements
            .get(index)
            .ok_or_else(|| BrowserError::ElementNotFound(format!("{} [{}]", selector, index)))?;

        element
            .click()
            .map_err(|e| BrowserError::ClickError(format!("{} [{}]: {}", selector, index, e)))?;

        Ok(())
    }
}

/// Quote `value` as a JavaScript string literal
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Script returning a JSON array of [`Element`] snapshots for the matches of `selector`
/// under the node `root` evaluates to. A null root yields an empty array.
fn snapshot_script(root: &str, selector: &str) -> String {
    format!(
        r#"(() => {{
            const root = {};
            if (!root) return '[]';
            const attrs = (el) => Object.fromEntries(Array.from(el.attributes).map((a) => [a.name, a.value]));
            return JSON.stringify(Array.from(root.querySelectorAll({})).map((el) => {{
                const control = el.closest('[role="button"]');
                return {{
                    text: (el.innerText || '').trim(),
                    attributes: attrs(el),
                    control: control ? attrs(control) : null,
                }};
            }}));
        }})()"#,
        root,
        js_string(selector)
    )
}
