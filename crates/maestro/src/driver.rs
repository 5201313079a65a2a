//! PageDriver - Abstract Browser Automation Trait
//!
//! Every DSL action and assertion wraps exactly one call on this trait. The
//! trait is the whole contract with the automation backend: locating elements
//! through a [`Locator`] chain, acting on them, navigating, and evaluating
//! scripts. Auto-waiting and retries, if any, live behind it.
//!
//! # Implementations
//!
//! - `ChromiumDriver` - real browser over CDP (feature `browser`)
//! - [`MockDriver`] - in-memory scripted page for unit tests

use crate::assertion::is_truthy;
use crate::locator::Locator;
use crate::result::{MaestroError, MaestroResult};
use crate::wait::{UrlPattern, WaitOptions};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Abstract driver trait for browser automation
///
/// Element methods receive the full root-to-leaf chain; each selector after
/// the first must be looked up inside the elements matched by the previous
/// one.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> MaestroResult<()>;

    /// Get current URL
    async fn current_url(&self) -> MaestroResult<String>;

    /// Wait until the page URL matches `pattern`
    async fn wait_for_url(&self, pattern: &UrlPattern, options: WaitOptions) -> MaestroResult<()>;

    /// Evaluate a script (expression or function source) in the page
    async fn evaluate(&self, script: &str) -> MaestroResult<Value>;

    /// Wait until `script` evaluates to a truthy value
    async fn wait_for_function(&self, script: &str, options: WaitOptions) -> MaestroResult<()>;

    /// Click element
    async fn click(&self, locator: &Locator) -> MaestroResult<()>;

    /// Double-click element
    async fn double_click(&self, locator: &Locator) -> MaestroResult<()>;

    /// Move the pointer over element
    async fn hover(&self, locator: &Locator) -> MaestroResult<()>;

    /// Press a key (e.g. "Enter") with element focused
    async fn press(&self, locator: &Locator, key: &str) -> MaestroResult<()>;

    /// Replace element's input value with `text`
    async fn fill(&self, locator: &Locator, text: &str) -> MaestroResult<()>;

    /// Text content of the first matching element
    async fn text_content(&self, locator: &Locator) -> MaestroResult<String>;

    /// Text content of every matching element, in document order
    async fn all_text_contents(&self, locator: &Locator) -> MaestroResult<Vec<String>>;

    /// Attribute value of the first matching element
    async fn attribute(&self, locator: &Locator, name: &str) -> MaestroResult<Option<String>>;

    /// Whether the first matching element is visible
    async fn is_visible(&self, locator: &Locator) -> MaestroResult<bool>;

    /// Whether no matching element is visible
    async fn is_hidden(&self, locator: &Locator) -> MaestroResult<bool> {
        Ok(!self.is_visible(locator).await?)
    }

    /// Input value of the first matching element
    async fn input_value(&self, locator: &Locator) -> MaestroResult<String>;

    /// Number of matching elements
    async fn count(&self, locator: &Locator) -> MaestroResult<usize>;
}

// ============================================================================
// Mock driver
// ============================================================================

/// Scripted element state for [`MockDriver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Text of each matching element
    pub texts: Vec<String>,
    /// Attributes of the first match
    pub attributes: HashMap<String, String>,
    /// Visibility of the first match
    pub visible: bool,
    /// Input value of the first match
    pub value: String,
    /// Number of matches
    pub count: usize,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            texts: Vec::new(),
            attributes: HashMap::new(),
            visible: true,
            value: String::new(),
            count: 1,
        }
    }
}

impl MockElement {
    /// Create a single visible, empty element
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text of a single match
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.texts = vec![text.into()];
        self
    }

    /// Set texts of several matches (also sets the count)
    #[must_use]
    pub fn with_texts<S: Into<String>>(mut self, texts: impl IntoIterator<Item = S>) -> Self {
        self.texts = texts.into_iter().map(Into::into).collect();
        self.count = self.texts.len();
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Mark hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Set the input value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the match count
    #[must_use]
    pub const fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    current_url: String,
    elements: HashMap<String, MockElement>,
    js_results: HashMap<String, Value>,
    call_history: Vec<String>,
    failures: Vec<String>,
}

/// Mock driver for unit testing
///
/// Elements are keyed by the locator's display string
/// (`".todoapp >> .todo-list"`). Actions on unknown locators succeed and are
/// only recorded; queries on unknown locators report no match.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a mock element under a locator chain
    #[must_use]
    pub fn with_element(self, locator: impl Into<String>, element: MockElement) -> Self {
        self.set_element(locator, element);
        self
    }

    /// Register a JS result for an exact script
    #[must_use]
    pub fn with_js_result(self, script: impl Into<String>, result: Value) -> Self {
        self.set_js_result(script, result);
        self
    }

    /// Register or replace a mock element
    pub fn set_element(&self, locator: impl Into<String>, element: MockElement) {
        self.lock().elements.insert(locator.into(), element);
    }

    /// Register or replace a JS result
    pub fn set_js_result(&self, script: impl Into<String>, result: Value) {
        self.lock().js_results.insert(script.into(), result);
    }

    /// Make every call whose history entry starts with `prefix` fail
    pub fn fail_on(&self, prefix: impl Into<String>) {
        self.lock().failures.push(prefix.into());
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.lock().call_history.iter().any(|c| c.starts_with(method))
    }

    /// Record a call, failing if it matches an injected failure
    fn record(&self, entry: String) -> MaestroResult<()> {
        let mut state = self.lock();
        let injected = state.failures.iter().any(|f| entry.starts_with(f.as_str()));
        state.call_history.push(entry.clone());
        if injected {
            return Err(MaestroError::driver(format!("injected failure: {entry}")));
        }
        Ok(())
    }

    fn query<T>(
        &self,
        locator: &Locator,
        read: impl FnOnce(&MockElement) -> T,
    ) -> MaestroResult<T> {
        self.lock()
            .elements
            .get(&locator.to_string())
            .filter(|e| e.count > 0)
            .map(read)
            .ok_or_else(|| MaestroError::ElementNotFound {
                selector: locator.to_string(),
            })
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&self, url: &str) -> MaestroResult<()> {
        self.record(format!("navigate:{url}"))?;
        self.lock().current_url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> MaestroResult<String> {
        Ok(self.lock().current_url.clone())
    }

    async fn wait_for_url(&self, pattern: &UrlPattern, options: WaitOptions) -> MaestroResult<()> {
        self.record(format!("wait_for_url:{pattern}"))?;
        if pattern.matches(&self.lock().current_url) {
            Ok(())
        } else {
            Err(MaestroError::Timeout {
                ms: options.timeout_ms,
            })
        }
    }

    async fn evaluate(&self, script: &str) -> MaestroResult<Value> {
        self.record(format!("evaluate:{script}"))?;
        self.lock()
            .js_results
            .get(script)
            .cloned()
            .ok_or_else(|| MaestroError::Evaluation {
                message: format!("No mock JS result set for {script}"),
            })
    }

    async fn wait_for_function(&self, script: &str, options: WaitOptions) -> MaestroResult<()> {
        self.record(format!("wait_for_function:{script}"))?;
        let truthy = self.lock().js_results.get(script).is_some_and(is_truthy);
        if truthy {
            Ok(())
        } else {
            Err(MaestroError::Timeout {
                ms: options.timeout_ms,
            })
        }
    }

    async fn click(&self, locator: &Locator) -> MaestroResult<()> {
        self.record(format!("click:{locator}"))
    }

    async fn double_click(&self, locator: &Locator) -> MaestroResult<()> {
        self.record(format!("double_click:{locator}"))
    }

    async fn hover(&self, locator: &Locator) -> MaestroResult<()> {
        self.record(format!("hover:{locator}"))
    }

    async fn press(&self, locator: &Locator, key: &str) -> MaestroResult<()> {
        self.record(format!("press:{locator}:{key}"))
    }

    async fn fill(&self, locator: &Locator, text: &str) -> MaestroResult<()> {
        self.record(format!("fill:{locator}:{text}"))?;
        self.lock()
            .elements
            .entry(locator.to_string())
            .or_default()
            .value = text.to_string();
        Ok(())
    }

    async fn text_content(&self, locator: &Locator) -> MaestroResult<String> {
        self.record(format!("text_content:{locator}"))?;
        self.query(locator, |e| e.texts.first().cloned().unwrap_or_default())
    }

    async fn all_text_contents(&self, locator: &Locator) -> MaestroResult<Vec<String>> {
        self.record(format!("all_text_contents:{locator}"))?;
        Ok(self
            .lock()
            .elements
            .get(&locator.to_string())
            .map(|e| e.texts.clone())
            .unwrap_or_default())
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> MaestroResult<Option<String>> {
        self.record(format!("attribute:{locator}:{name}"))?;
        self.query(locator, |e| e.attributes.get(name).cloned())
    }

    async fn is_visible(&self, locator: &Locator) -> MaestroResult<bool> {
        self.record(format!("is_visible:{locator}"))?;
        Ok(self.query(locator, |e| e.visible).unwrap_or(false))
    }

    async fn is_hidden(&self, locator: &Locator) -> MaestroResult<bool> {
        self.record(format!("is_hidden:{locator}"))?;
        Ok(!self.query(locator, |e| e.visible).unwrap_or(false))
    }

    async fn input_value(&self, locator: &Locator) -> MaestroResult<String> {
        self.record(format!("input_value:{locator}"))?;
        self.query(locator, |e| e.value.clone())
    }

    async fn count(&self, locator: &Locator) -> MaestroResult<usize> {
        self.record(format!("count:{locator}"))?;
        Ok(self
            .lock()
            .elements
            .get(&locator.to_string())
            .map_or(0, |e| e.count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod mock_element_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let e = MockElement::new();
            assert!(e.visible);
            assert_eq!(e.count, 1);
            assert!(e.texts.is_empty());
        }

        #[test]
        fn test_with_texts_sets_count() {
            let e = MockElement::new().with_texts(["a", "b", "c"]);
            assert_eq!(e.count, 3);
        }
    }

    mod mock_driver_tests {
        use super::*;

        #[tokio::test]
        async fn test_navigate_updates_url() {
            let driver = MockDriver::new();
            driver.navigate("https://example.test/todo").await.unwrap();
            assert_eq!(driver.current_url().await.unwrap(), "https://example.test/todo");
            assert!(driver.was_called("navigate"));
        }

        #[tokio::test]
        async fn test_fill_updates_value() {
            let driver = MockDriver::new();
            let input = Locator::root(".new-todo");
            driver.fill(&input, "milk").await.unwrap();
            assert_eq!(driver.input_value(&input).await.unwrap(), "milk");
            assert_eq!(
                driver.history(),
                vec!["fill:.new-todo:milk", "input_value:.new-todo"]
            );
        }

        #[tokio::test]
        async fn test_queries_on_unknown_locator() {
            let driver = MockDriver::new();
            let missing = Locator::root(".nope");
            assert_eq!(driver.count(&missing).await.unwrap(), 0);
            assert!(!driver.is_visible(&missing).await.unwrap());
            assert!(driver.is_hidden(&missing).await.unwrap());
            assert!(matches!(
                driver.text_content(&missing).await,
                Err(MaestroError::ElementNotFound { .. })
            ));
        }

        #[tokio::test]
        async fn test_nested_elements_keyed_by_chain() {
            let driver = MockDriver::new()
                .with_element(".todoapp >> .todo-list", MockElement::new().with_text("x"));
            let nested = Locator::root(".todoapp").locator(".todo-list");
            let flat = Locator::root(".todo-list");
            assert_eq!(driver.text_content(&nested).await.unwrap(), "x");
            assert!(driver.text_content(&flat).await.is_err());
        }

        #[tokio::test]
        async fn test_evaluate_and_wait_for_function() {
            let driver = MockDriver::new()
                .with_js_result("window.ready", json!(true))
                .with_js_result("window.count", json!(0));
            assert_eq!(driver.evaluate("window.ready").await.unwrap(), json!(true));
            assert!(driver.evaluate("unknown").await.is_err());
            let opts = WaitOptions::new().with_timeout(10);
            driver.wait_for_function("window.ready", opts).await.unwrap();
            assert!(matches!(
                driver.wait_for_function("window.count", opts).await,
                Err(MaestroError::Timeout { ms: 10 })
            ));
        }

        #[tokio::test]
        async fn test_wait_for_url() {
            let driver = MockDriver::new();
            driver.navigate("https://example.test/todo/active").await.unwrap();
            let opts = WaitOptions::default();
            driver
                .wait_for_url(&UrlPattern::from("**/active"), opts)
                .await
                .unwrap();
            assert!(driver
                .wait_for_url(&UrlPattern::from("https://other.test"), opts)
                .await
                .is_err());
        }

        #[tokio::test]
        async fn test_fail_on_injects_error() {
            let driver = MockDriver::new();
            driver.fail_on("click:.danger");
            driver.click(&Locator::root(".safe")).await.unwrap();
            let err = driver.click(&Locator::root(".danger")).await.unwrap_err();
            assert!(err.to_string().contains("injected failure"));
            assert_eq!(driver.history().len(), 2);
        }
    }
}
