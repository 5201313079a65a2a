//! Browser control over the Chrome DevTools Protocol.
//!
//! [`ChromiumDriver`] implements [`PageDriver`] against a real Chromium page
//! through chromiumoxide. Every element operation is a small script built from
//! the locator's scoped query and evaluated in the page; waits poll until
//! their timeout.

use crate::assertion::is_truthy;
use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::result::{MaestroError, MaestroResult};
use crate::wait::{UrlPattern, WaitOptions};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde_json::Value;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Browser configuration
#[derive(Debug, Clone)]
pub struct ChromiumConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for ChromiumConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl ChromiumConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Chromium-backed page driver
#[derive(Debug)]
pub struct ChromiumDriver {
    config: ChromiumConfig,
    browser: Mutex<CdpBrowser>,
    page: CdpPage,
    #[allow(dead_code)]
    handle: tokio::task::JoinHandle<()>,
}

impl ChromiumDriver {
    /// Launch a browser and open a blank page
    pub async fn launch(config: ChromiumConfig) -> MaestroResult<Self> {
        let mut builder =
            CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder.build().map_err(MaestroError::driver)?;

        let (browser, mut handler) = CdpBrowser::launch(cdp_config)
            .await
            .map_err(|e| MaestroError::driver(e.to_string()))?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| MaestroError::driver(e.to_string()))?;

        tracing::debug!(headless = config.headless, "chromium launched");

        Ok(Self {
            config,
            browser: Mutex::new(browser),
            page,
            handle,
        })
    }

    /// Get the browser configuration
    #[must_use]
    pub const fn config(&self) -> &ChromiumConfig {
        &self.config
    }

    /// Close the browser
    pub async fn close(self) -> MaestroResult<()> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| MaestroError::driver(e.to_string()))?;
        Ok(())
    }

    async fn eval_raw(&self, expression: &str) -> MaestroResult<Value> {
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|e| MaestroError::Evaluation {
                message: e.to_string(),
            })?;
        result
            .into_value::<Value>()
            .map_err(|e| MaestroError::Evaluation {
                message: e.to_string(),
            })
    }

    /// Run an element script; `null` means nothing matched
    async fn on_element(&self, locator: &Locator, script: String) -> MaestroResult<Value> {
        match self.eval_raw(&script).await? {
            Value::Null => Err(MaestroError::ElementNotFound {
                selector: locator.to_string(),
            }),
            value => Ok(value),
        }
    }
}

// ============================================================================
// Script builders
// ============================================================================

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

/// Wrap an element body; the body sees the first match as `el`
fn element_script(locator: &Locator, body: &str) -> String {
    format!(
        "(() => {{ const el = {}; if (!el) return null; {body} }})()",
        locator.to_query()
    )
}

/// Evaluate an expression or call a function source, awaiting promises
fn user_script(script: &str) -> String {
    format!(
        "(async () => {{ let v = ({script}); if (typeof v === 'function') v = v(); v = await v; return v === undefined ? null : v; }})()"
    )
}

fn click_script(locator: &Locator) -> String {
    element_script(
        locator,
        "el.scrollIntoView({ block: 'center' }); el.click(); return true;",
    )
}

fn double_click_script(locator: &Locator) -> String {
    element_script(
        locator,
        "el.scrollIntoView({ block: 'center' }); el.click(); el.click(); \
         el.dispatchEvent(new MouseEvent('dblclick', { bubbles: true, cancelable: true, detail: 2 })); \
         return true;",
    )
}

fn hover_script(locator: &Locator) -> String {
    element_script(
        locator,
        "for (const t of ['pointerover', 'mouseover', 'mouseenter', 'mousemove']) { \
         el.dispatchEvent(new MouseEvent(t, { bubbles: t !== 'mouseenter' })); } \
         return true;",
    )
}

fn press_script(locator: &Locator, key: &str) -> String {
    let key = quote(key);
    element_script(
        locator,
        &format!(
            "el.focus(); \
             for (const t of ['keydown', 'keypress', 'keyup']) {{ \
             el.dispatchEvent(new KeyboardEvent(t, {{ key: {key}, bubbles: true, cancelable: true }})); }} \
             return true;"
        ),
    )
}

fn fill_script(locator: &Locator, text: &str) -> String {
    let text = quote(text);
    element_script(
        locator,
        &format!(
            "el.focus(); \
             const proto = Object.getPrototypeOf(el); \
             const setter = Object.getOwnPropertyDescriptor(proto, 'value')?.set; \
             if (setter) {{ setter.call(el, {text}); }} else {{ el.value = {text}; }} \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true;"
        ),
    )
}

fn visible_script(locator: &Locator) -> String {
    format!(
        "(() => {{ const el = {}; if (!el) return false; \
         const style = getComputedStyle(el); \
         return style.visibility !== 'hidden' && style.display !== 'none' \
         && el.getClientRects().length > 0; }})()",
        locator.to_query()
    )
}

/// Poll `check` until it reports `true` or the deadline passes.
///
/// An error from `check` ends the wait immediately and is returned unchanged.
async fn poll_until<F, Fut>(options: WaitOptions, mut check: F) -> MaestroResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = MaestroResult<bool>>,
{
    let deadline = Instant::now() + Duration::from_millis(options.timeout_ms);
    loop {
        if check().await? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(MaestroError::Timeout {
                ms: options.timeout_ms,
            });
        }
        tokio::time::sleep(Duration::from_millis(options.poll_interval_ms)).await;
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> MaestroResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| MaestroError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> MaestroResult<String> {
        match self.eval_raw("window.location.href").await? {
            Value::String(url) => Ok(url),
            other => Ok(other.to_string()),
        }
    }

    async fn wait_for_url(&self, pattern: &UrlPattern, options: WaitOptions) -> MaestroResult<()> {
        poll_until(options, || async move {
            Ok(pattern.matches(&self.current_url().await?))
        })
        .await
    }

    async fn evaluate(&self, script: &str) -> MaestroResult<Value> {
        self.eval_raw(&user_script(script)).await
    }

    async fn wait_for_function(&self, script: &str, options: WaitOptions) -> MaestroResult<()> {
        let wrapped = &user_script(script);
        poll_until(options, || async move {
            Ok(is_truthy(&self.eval_raw(wrapped).await?))
        })
        .await
    }

    async fn click(&self, locator: &Locator) -> MaestroResult<()> {
        self.on_element(locator, click_script(locator)).await.map(|_| ())
    }

    async fn double_click(&self, locator: &Locator) -> MaestroResult<()> {
        self.on_element(locator, double_click_script(locator))
            .await
            .map(|_| ())
    }

    async fn hover(&self, locator: &Locator) -> MaestroResult<()> {
        self.on_element(locator, hover_script(locator)).await.map(|_| ())
    }

    async fn press(&self, locator: &Locator, key: &str) -> MaestroResult<()> {
        self.on_element(locator, press_script(locator, key))
            .await
            .map(|_| ())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> MaestroResult<()> {
        self.on_element(locator, fill_script(locator, text))
            .await
            .map(|_| ())
    }

    async fn text_content(&self, locator: &Locator) -> MaestroResult<String> {
        let value = self
            .on_element(locator, element_script(locator, "return el.textContent ?? '';"))
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn all_text_contents(&self, locator: &Locator) -> MaestroResult<Vec<String>> {
        let script = format!("{}.map(e => e.textContent ?? '')", locator.to_query_all());
        Ok(serde_json::from_value(self.eval_raw(&script).await?)?)
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> MaestroResult<Option<String>> {
        let body = format!("return {{ value: el.getAttribute({}) }};", quote(name));
        let value = self
            .on_element(locator, element_script(locator, &body))
            .await?;
        Ok(value
            .get("value")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn is_visible(&self, locator: &Locator) -> MaestroResult<bool> {
        Ok(is_truthy(&self.eval_raw(&visible_script(locator)).await?))
    }

    async fn input_value(&self, locator: &Locator) -> MaestroResult<String> {
        let value = self
            .on_element(locator, element_script(locator, "return el.value ?? '';"))
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn count(&self, locator: &Locator) -> MaestroResult<usize> {
        let script = format!("{}.length", locator.to_query_all());
        Ok(serde_json::from_value(self.eval_raw(&script).await?)?)
    }
}
