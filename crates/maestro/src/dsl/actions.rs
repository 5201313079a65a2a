//! Page actions.
//!
//! Every function here resolves its target immediately, captures the result
//! and a page handle in a deferred command, and enqueues it. Nothing touches
//! the page until the run phase.

use crate::command::Command;
use crate::driver::PageDriver;
use crate::result::MaestroResult;
use crate::session::{enqueue, Session};
use crate::target::{ResolvedTarget, Target};
use crate::wait::UrlPattern;
use serde_json::Value;
use std::sync::Arc;

fn page() -> MaestroResult<Arc<dyn PageDriver>> {
    Session::current().map(|session| Arc::clone(session.page()))
}

/// Navigate to `url`
pub fn goto(url: impl Into<String>) -> MaestroResult<()> {
    let page = page()?;
    let url = url.into();
    enqueue(Command::new(format!("Navigating to URL: {url}"), async move {
        page.navigate(&url).await
    }))
}

/// Click the target
pub fn click_on(target: impl Into<Target>) -> MaestroResult<()> {
    let page = page()?;
    let ResolvedTarget {
        locator,
        description,
    } = target.into().resolve();
    enqueue(Command::new(
        format!("Clicking on element: {description}"),
        async move { page.click(&locator).await },
    ))
}

/// Double-click the target
pub fn double_click_on(target: impl Into<Target>) -> MaestroResult<()> {
    let page = page()?;
    let ResolvedTarget {
        locator,
        description,
    } = target.into().resolve();
    enqueue(Command::new(
        format!("Double-clicking on element: {description}"),
        async move { page.double_click(&locator).await },
    ))
}

/// Hover over the target
pub fn hover_over(target: impl Into<Target>) -> MaestroResult<()> {
    let page = page()?;
    let ResolvedTarget {
        locator,
        description,
    } = target.into().resolve();
    enqueue(Command::new(
        format!("Hovering over element: {description}"),
        async move { page.hover(&locator).await },
    ))
}

/// Press `key` with the target focused
pub fn press_key_on(target: impl Into<Target>, key: impl Into<String>) -> MaestroResult<()> {
    let page = page()?;
    let key = key.into();
    let ResolvedTarget {
        locator,
        description,
    } = target.into().resolve();
    enqueue(Command::new(
        format!("Pressing key \"{key}\" on element: {description}"),
        async move { page.press(&locator, &key).await },
    ))
}

/// Press Enter on the target
pub fn press_enter_on(target: impl Into<Target>) -> MaestroResult<()> {
    press_key_on(target, "Enter")
}

/// Press Backspace on the target
pub fn press_backspace_on(target: impl Into<Target>) -> MaestroResult<()> {
    press_key_on(target, "Backspace")
}

/// Press Escape on the target
pub fn press_escape_on(target: impl Into<Target>) -> MaestroResult<()> {
    press_key_on(target, "Escape")
}

/// Start typing: `enter("milk").into(&todo_input)?`
#[must_use]
pub fn enter(text: impl Into<String>) -> EnterText {
    EnterText { text: text.into() }
}

/// Pending text entry, see [`enter`]
#[derive(Debug, Clone)]
pub struct EnterText {
    text: String,
}

impl EnterText {
    /// Fill the target with the text
    #[allow(clippy::should_implement_trait, clippy::wrong_self_convention)]
    pub fn into(self, target: impl Into<Target>) -> MaestroResult<()> {
        let page = page()?;
        let text = self.text;
        let ResolvedTarget {
            locator,
            description,
        } = target.into().resolve();
        enqueue(Command::new(
            format!("Entering text \"{text}\" into element: {description}"),
            async move { page.fill(&locator, &text).await },
        ))
    }
}

/// Wait until the page URL matches `pattern`
pub fn wait_until_url_is(pattern: impl Into<UrlPattern>) -> MaestroResult<()> {
    let session = Session::current()?;
    let page = Arc::clone(session.page());
    let options = session.config().wait;
    let pattern = pattern.into();
    enqueue(Command::new(
        format!("Waiting until URL is: {pattern}"),
        async move { page.wait_for_url(&pattern, options).await },
    ))
}

/// Wait until `script` evaluates truthy in the page
pub fn wait_for_function(script: impl Into<String>) -> MaestroResult<()> {
    let session = Session::current()?;
    let page = Arc::clone(session.page());
    let options = session.config().wait;
    let script = script.into();
    enqueue(Command::new("Waiting for function to return true", async move {
        page.wait_for_function(&script, options).await
    }))
}

/// Evaluate `script` in the page and store its result under `name`
///
/// Enqueues two commands: the evaluation, then a reporting-only command that
/// reads the stored value back.
pub fn save_result_as(name: impl Into<String>, script: impl Into<String>) -> MaestroResult<()> {
    let session = Session::current()?;
    let name = name.into();
    let script = script.into();

    let page = Arc::clone(session.page());
    let context = session.context().clone();
    let key = name.clone();
    let label = format!("Evaluating function \"{script}\"");
    enqueue(Command::new(label, async move {
        let value = page.evaluate(&script).await?;
        context.set(key, value);
        Ok(())
    }))?;

    let context = session.context().clone();
    let reporter = session.reporter().clone();
    enqueue(Command::new(
        format!("Saving result as '{name}'"),
        async move {
            let value = context.get(&name).unwrap_or(Value::Null);
            tracing::info!(name = %name, value = %value, "saved result");
            reporter.annotate("value", value.to_string());
            Ok(())
        },
    ))
}
