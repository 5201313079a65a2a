//! Assertions for test validation.
//!
//! Pure comparisons over JSON values. Each returns an [`AssertionResult`]
//! carrying display-ready expected/actual strings; the DSL converts a failing
//! result into [`MaestroError::AssertionFailed`] named after its target.

use crate::result::{MaestroError, MaestroResult};
use serde_json::Value;

/// Rendering used for a missing value
pub const UNDEFINED: &str = "undefined";

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Expected value, rendered for reports
    pub expected: String,
    /// Observed value, rendered for reports
    pub actual: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            expected: String::new(),
            actual: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            passed: false,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Pass when `condition` holds, otherwise fail with the given renderings
    #[must_use]
    pub fn check(condition: bool, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        if condition {
            Self::pass()
        } else {
            Self::fail(expected, actual)
        }
    }

    /// Convert into a `Result`, naming `target` on failure
    pub fn into_result(self, target: &str) -> MaestroResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(MaestroError::assertion(target, self.expected, self.actual))
        }
    }
}

/// Assertion helpers for testing
#[derive(Debug, Clone, Copy)]
pub struct Assertion;

impl Assertion {
    /// Assert a value equals `expected`
    ///
    /// Scalars compare strictly by type and value, except that numbers
    /// compare numerically. Arrays and objects compare element-wise.
    #[must_use]
    pub fn equals(expected: &Value, actual: Option<&Value>) -> AssertionResult {
        let equal = actual.is_some_and(|a| values_equal(expected, a));
        AssertionResult::check(equal, expected.to_string(), render(actual))
    }

    /// Assert a value contains `item`
    ///
    /// Strings contain substrings, arrays contain elements, objects contain
    /// keys. Any other container fails.
    #[must_use]
    pub fn contains(container: Option<&Value>, item: &Value) -> AssertionResult {
        let found = match (container, item) {
            (Some(Value::String(haystack)), Value::String(needle)) => haystack.contains(needle.as_str()),
            (Some(Value::Array(elements)), _) => elements.iter().any(|e| values_equal(e, item)),
            (Some(Value::Object(map)), Value::String(key)) => map.contains_key(key),
            _ => false,
        };
        AssertionResult::check(found, format!("to contain {item}"), render(container))
    }

    /// Assert a value is present (a stored `null` counts)
    #[must_use]
    pub fn is_defined(actual: Option<&Value>) -> AssertionResult {
        AssertionResult::check(actual.is_some(), "defined", UNDEFINED)
    }

    /// Assert a count
    #[must_use]
    pub fn count_equals(expected: usize, actual: usize) -> AssertionResult {
        AssertionResult::check(
            expected == actual,
            format!("{expected} element(s)"),
            format!("{actual} element(s)"),
        )
    }
}

/// Strict JSON equality with numeric comparison for numbers
#[must_use]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// JavaScript truthiness of a JSON value
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render(value: Option<&Value>) -> String {
    value.map_or_else(|| UNDEFINED.to_string(), Value::to_string)
}
