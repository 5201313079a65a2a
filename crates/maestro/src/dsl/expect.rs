//! Expectations on elements and on the run context.
//!
//! `expect(target)` and `expect_context(key)` return small builder values;
//! each method on them enqueues one assertion command. Assertions compare
//! once and never retry.

use crate::assertion::{Assertion, AssertionResult};
use crate::command::Command;
use crate::result::MaestroResult;
use crate::session::{enqueue, Session};
use crate::target::{ResolvedTarget, Target};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Text matching
// ============================================================================

/// Expected text for [`ElementExpectation::to_have_text`]
#[derive(Debug, Clone)]
pub enum TextMatcher {
    /// Whole text equals this string, whitespace-normalized
    Exact(String),
    /// Text matches this regex
    Pattern(Regex),
    /// One entry per matching element, in document order
    List(Vec<String>),
}

impl TextMatcher {
    fn matches_one(&self, text: &str) -> bool {
        match self {
            Self::Exact(expected) => normalize_whitespace(text) == normalize_whitespace(expected),
            Self::Pattern(re) => re.is_match(text),
            Self::List(_) => false,
        }
    }
}

/// Collapse runs of whitespace and trim
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl fmt::Display for TextMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(text) => write!(f, "{text}"),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
            Self::List(items) => write!(f, "{}", items.join(",")),
        }
    }
}

impl From<&str> for TextMatcher {
    fn from(text: &str) -> Self {
        Self::Exact(text.to_string())
    }
}

impl From<String> for TextMatcher {
    fn from(text: String) -> Self {
        Self::Exact(text)
    }
}

impl From<Regex> for TextMatcher {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

impl From<Vec<String>> for TextMatcher {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for TextMatcher {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TextMatcher {
    fn from(items: [&str; N]) -> Self {
        Self::List(items.iter().map(|s| (*s).to_string()).collect())
    }
}

// ============================================================================
// Element expectations
// ============================================================================

/// Expect something of an element
///
/// The target is resolved now; nothing is enqueued until a method is called.
#[must_use]
pub fn expect(target: impl Into<Target>) -> ElementExpectation {
    ElementExpectation {
        target: target.into().resolve(),
    }
}

/// Pending element expectation, see [`expect`]
#[derive(Debug, Clone)]
#[must_use = "an expectation does nothing until one of its methods is called"]
pub struct ElementExpectation {
    target: ResolvedTarget,
}

impl ElementExpectation {
    /// Element text matches `expected`
    pub fn to_have_text(self, expected: impl Into<TextMatcher>) -> MaestroResult<()> {
        let page = Arc::clone(Session::current()?.page());
        let expected = expected.into();
        let ResolvedTarget {
            locator,
            description,
        } = self.target;
        let label = format!("Expecting element \"{description}\" to have text: {expected}");
        enqueue(Command::new(label, async move {
            let result = match &expected {
                TextMatcher::List(items) => {
                    let actual = page.all_text_contents(&locator).await?;
                    let matched = actual.len() == items.len()
                        && actual
                            .iter()
                            .zip(items)
                            .all(|(a, e)| normalize_whitespace(a) == normalize_whitespace(e));
                    AssertionResult::check(matched, format!("{items:?}"), format!("{actual:?}"))
                }
                matcher => {
                    let actual = page.text_content(&locator).await?;
                    AssertionResult::check(
                        matcher.matches_one(&actual),
                        format!("{:?}", matcher.to_string()),
                        format!("{actual:?}"),
                    )
                }
            };
            result.into_result(&description)
        }))
    }

    /// Element is visible
    pub fn is_visible(self) -> MaestroResult<()> {
        let page = Arc::clone(Session::current()?.page());
        let ResolvedTarget {
            locator,
            description,
        } = self.target;
        let label = format!("Expecting element \"{description}\" to be visible");
        enqueue(Command::new(label, async move {
            let visible = page.is_visible(&locator).await?;
            AssertionResult::check(visible, "visible", "hidden").into_result(&description)
        }))
    }

    /// Element is hidden or absent
    pub fn is_hidden(self) -> MaestroResult<()> {
        let page = Arc::clone(Session::current()?.page());
        let ResolvedTarget {
            locator,
            description,
        } = self.target;
        let label = format!("Expecting element \"{description}\" to be hidden");
        enqueue(Command::new(label, async move {
            let hidden = page.is_hidden(&locator).await?;
            AssertionResult::check(hidden, "hidden", "visible").into_result(&description)
        }))
    }

    /// Input value is empty
    pub fn is_empty(self) -> MaestroResult<()> {
        let page = Arc::clone(Session::current()?.page());
        let ResolvedTarget {
            locator,
            description,
        } = self.target;
        let label = format!("Expecting input \"{description}\" to be empty");
        enqueue(Command::new(label, async move {
            let value = page.input_value(&locator).await?;
            AssertionResult::check(value.is_empty(), "\"\"", format!("{value:?}"))
                .into_result(&description)
        }))
    }

    /// Attribute `name` equals `value`
    pub fn has_attribute(
        self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> MaestroResult<()> {
        let page = Arc::clone(Session::current()?.page());
        let name = name.into();
        let value = value.into();
        let ResolvedTarget {
            locator,
            description,
        } = self.target;
        let label = format!(
            "Expecting element \"{description}\" to have attribute \"{name}\" with value \"{value}\""
        );
        enqueue(Command::new(label, async move {
            let actual = page.attribute(&locator, &name).await?;
            AssertionResult::check(
                actual.as_deref() == Some(value.as_str()),
                format!("{name}={value:?}"),
                actual.map_or_else(|| format!("{name} absent"), |a| format!("{name}={a:?}")),
            )
            .into_result(&description)
        }))
    }

    /// Exactly `expected` elements match
    pub fn count_is(self, expected: usize) -> MaestroResult<()> {
        let page = Arc::clone(Session::current()?.page());
        let ResolvedTarget {
            locator,
            description,
        } = self.target;
        let label = format!("Expecting element \"{description}\" to have count: {expected}");
        enqueue(Command::new(label, async move {
            let actual = page.count(&locator).await?;
            Assertion::count_equals(expected, actual).into_result(&description)
        }))
    }
}

// ============================================================================
// Context expectations
// ============================================================================

/// Expect something of a saved context value
#[must_use]
pub fn expect_context(key: impl Into<String>) -> ContextExpectation {
    ContextExpectation { key: key.into() }
}

/// Pending context expectation, see [`expect_context`]
#[derive(Debug, Clone)]
#[must_use = "an expectation does nothing until one of its methods is called"]
pub struct ContextExpectation {
    key: String,
}

/// Strings render bare, everything else as JSON
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ContextExpectation {
    fn schedule<F>(self, label: String, check: F) -> MaestroResult<()>
    where
        F: FnOnce(Option<&Value>) -> AssertionResult + Send + 'static,
    {
        let context = Session::current()?.context().clone();
        let key = self.key;
        enqueue(Command::new(label, async move {
            let actual = context.get(&key);
            check(actual.as_ref()).into_result(&format!("context property \"{key}\""))
        }))
    }

    /// Value equals `expected`
    pub fn to_equal(self, expected: impl Serialize) -> MaestroResult<()> {
        let expected = serde_json::to_value(expected)?;
        let label = format!(
            "Expecting context property \"{}\" to equal \"{}\"",
            self.key,
            display_value(&expected)
        );
        self.schedule(label, move |actual| Assertion::equals(&expected, actual))
    }

    /// Value contains `item` (substring, array element or object key)
    pub fn to_contain(self, item: impl Serialize) -> MaestroResult<()> {
        let item = serde_json::to_value(item)?;
        let label = format!(
            "Expecting context property \"{}\" to contain \"{}\"",
            self.key,
            display_value(&item)
        );
        self.schedule(label, move |actual| Assertion::contains(actual, &item))
    }

    /// Key has been saved (a saved `null` counts)
    pub fn to_be_defined(self) -> MaestroResult<()> {
        let label = format!("Expecting context property \"{}\" to be defined", self.key);
        self.schedule(label, Assertion::is_defined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::UiComponent;
    use crate::config::RunnerConfig;
    use crate::context::Context;
    use crate::driver::{MockDriver, MockElement};
    use crate::reporter::StepReporter;
    use crate::result::MaestroError;
    use crate::runner::CommandRunner;
    use serde_json::json;

    async fn run_with(
        mock: &Arc<MockDriver>,
        context: &Context,
        author: impl FnOnce() -> MaestroResult<()>,
    ) -> MaestroResult<usize> {
        let reporter = StepReporter::new("expect");
        let session = Session::new(
            mock.clone(),
            context.clone(),
            reporter.clone(),
            Arc::new(RunnerConfig::default()),
        );
        let mut runner = CommandRunner::new(context.clone(), reporter);
        for command in session.capture_root(author)? {
            runner.add(command);
        }
        runner.run().await
    }

    fn assertion_parts(err: MaestroError) -> (String, String, String) {
        match err {
            MaestroError::AssertionFailed {
                target,
                expected,
                actual,
            } => (target, expected, actual),
            other => panic!("expected assertion failure, got {other}"),
        }
    }

    mod text_matcher_tests {
        use super::*;

        #[test]
        fn test_normalize_whitespace() {
            assert_eq!(normalize_whitespace("  Buy \n  milk "), "Buy milk");
        }

        #[test]
        fn test_exact_and_pattern() {
            assert!(TextMatcher::from("Buy milk").matches_one(" Buy   milk\n"));
            assert!(!TextMatcher::from("Buy milk").matches_one("Buy milk now"));
            let re = TextMatcher::from(Regex::new("^Buy").unwrap());
            assert!(re.matches_one("Buy eggs"));
            assert_eq!(re.to_string(), "/^Buy/");
        }

        #[test]
        fn test_list_display() {
            assert_eq!(TextMatcher::from(["a", "b"]).to_string(), "a,b");
        }
    }

    mod element_tests {
        use super::*;

        fn todo_title() -> Arc<UiComponent> {
            let app = UiComponent::new("Todo App Section", ".todoapp").shared();
            let list = UiComponent::child_of("Todo List Section", ".todo-list", &app).shared();
            UiComponent::child_of("Todo Title", "[data-testid=\"todo-title\"]", &list).shared()
        }

        #[tokio::test]
        async fn test_to_have_text_passes_and_fails() {
            let title = todo_title();
            let key = title.locator().to_string();
            let mock = Arc::new(
                MockDriver::new().with_element(key, MockElement::new().with_text("Buy milk")),
            );
            let ctx = Context::new();
            run_with(&mock, &ctx, || expect(&title).to_have_text("Buy milk"))
                .await
                .unwrap();

            let err = run_with(&mock, &ctx, || expect(&title).to_have_text("Buy eggs"))
                .await
                .unwrap_err();
            let (target, expected, actual) = assertion_parts(err);
            assert_eq!(target, "[Todo App Section > Todo List Section > Todo Title]");
            assert_eq!(expected, "\"Buy eggs\"");
            assert_eq!(actual, "\"Buy milk\"");
        }

        #[tokio::test]
        async fn test_to_have_text_list() {
            let mock = Arc::new(
                MockDriver::new().with_element("li", MockElement::new().with_texts(["a", "b"])),
            );
            let ctx = Context::new();
            run_with(&mock, &ctx, || expect("li").to_have_text(vec!["a", "b"]))
                .await
                .unwrap();
            assert!(run_with(&mock, &ctx, || expect("li").to_have_text(vec!["a"]))
                .await
                .is_err());
        }

        #[tokio::test]
        async fn test_visibility() {
            let mock = Arc::new(
                MockDriver::new()
                    .with_element(".shown", MockElement::new())
                    .with_element(".gone", MockElement::new().hidden()),
            );
            let ctx = Context::new();
            run_with(&mock, &ctx, || {
                expect(".shown").is_visible()?;
                expect(".gone").is_hidden()?;
                expect(".absent").is_hidden()
            })
            .await
            .unwrap();
            let err = run_with(&mock, &ctx, || expect(".gone").is_visible())
                .await
                .unwrap_err();
            let (_, expected, actual) = assertion_parts(err);
            assert_eq!((expected.as_str(), actual.as_str()), ("visible", "hidden"));
        }

        #[tokio::test]
        async fn test_is_empty_after_fill() {
            let mock = Arc::new(MockDriver::new().with_element(".new-todo", MockElement::new()));
            let ctx = Context::new();
            run_with(&mock, &ctx, || expect(".new-todo").is_empty())
                .await
                .unwrap();
            let err = run_with(&mock, &ctx, || {
                crate::dsl::enter("milk").into(".new-todo")?;
                expect(".new-todo").is_empty()
            })
            .await
            .unwrap_err();
            assert_eq!(assertion_parts(err).2, "\"milk\"");
        }

        #[tokio::test]
        async fn test_is_empty_rejects_prefilled_input() {
            let mock = Arc::new(MockDriver::new().with_element(
                ".edit",
                MockElement::new().with_value("Buy bread"),
            ));
            let ctx = Context::new();
            let err = run_with(&mock, &ctx, || expect(".edit").is_empty())
                .await
                .unwrap_err();
            let (_, expected, actual) = assertion_parts(err);
            assert_eq!((expected.as_str(), actual.as_str()), ("\"\"", "\"Buy bread\""));
        }

        #[tokio::test]
        async fn test_has_attribute_and_count() {
            let mock = Arc::new(
                MockDriver::new().with_element(
                    ".todo-list li",
                    MockElement::new()
                        .with_attribute("class", "completed")
                        .with_count(2),
                ),
            );
            let ctx = Context::new();
            run_with(&mock, &ctx, || {
                expect(".todo-list li").has_attribute("class", "completed")?;
                expect(".todo-list li").count_is(2)
            })
            .await
            .unwrap();

            let err = run_with(&mock, &ctx, || expect(".todo-list li").has_attribute("id", "x"))
                .await
                .unwrap_err();
            assert_eq!(assertion_parts(err).2, "id absent");

            let err = run_with(&mock, &ctx, || expect(".todo-list li").count_is(3))
                .await
                .unwrap_err();
            assert_eq!(assertion_parts(err).1, "3 element(s)");
        }

        #[tokio::test]
        async fn test_missing_element_is_driver_error() {
            let mock = Arc::new(MockDriver::new());
            let err = run_with(&mock, &Context::new(), || expect(".none").to_have_text("x"))
                .await
                .unwrap_err();
            assert!(matches!(err, MaestroError::ElementNotFound { .. }));
        }
    }

    mod context_tests {
        use super::*;

        #[tokio::test]
        async fn test_context_assertions() {
            let mock = Arc::new(MockDriver::new());
            let ctx = Context::new();
            ctx.set("todosCount", json!(1));
            ctx.set("title", json!("Buy milk"));
            ctx.set("tags", json!(["home", "urgent"]));
            ctx.set("nothing", Value::Null);
            run_with(&mock, &ctx, || {
                expect_context("todosCount").to_equal(1)?;
                expect_context("todosCount").to_equal(1.0)?;
                expect_context("title").to_contain("milk")?;
                expect_context("tags").to_contain("urgent")?;
                expect_context("nothing").to_be_defined()
            })
            .await
            .unwrap();
        }

        #[tokio::test]
        async fn test_context_failure_names_key() {
            let mock = Arc::new(MockDriver::new());
            let err = run_with(&mock, &Context::new(), || {
                expect_context("todosCount").to_be_defined()
            })
            .await
            .unwrap_err();
            let (target, expected, actual) = assertion_parts(err);
            assert_eq!(target, "context property \"todosCount\"");
            assert_eq!(expected, "defined");
            assert_eq!(actual, "undefined");
        }

        #[tokio::test]
        async fn test_strict_type_equality() {
            let mock = Arc::new(MockDriver::new());
            let ctx = Context::new();
            ctx.set("n", json!(1));
            assert!(run_with(&mock, &ctx, || expect_context("n").to_equal("1"))
                .await
                .is_err());
        }

        #[test]
        fn test_outside_context_fails() {
            assert!(matches!(
                expect_context("x").to_be_defined(),
                Err(MaestroError::UninitializedEngine)
            ));
        }
    }
}
