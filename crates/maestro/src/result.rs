//! Result and error types for Maestro.

use thiserror::Error;

/// Result type for Maestro operations
pub type MaestroResult<T> = Result<T, MaestroError>;

/// Errors that can occur while authoring or running a step queue
#[derive(Debug, Error)]
pub enum MaestroError {
    /// A DSL function was called outside of a bootstrapped test context
    #[error(
        "Command engine is not initialized. Author steps inside TestContext::at_page() or TestContext::steps()"
    )]
    UninitializedEngine,

    /// A root authoring pass was started while another one is active on this thread
    #[error("Another authoring pass is already active on this thread")]
    ReentrantAuthoring,

    /// Target could not be resolved to a locator
    #[error(
        "Invalid target type. Expected a selector string, Locator, or UiComponent, but received: {type_name}"
    )]
    InvalidTarget {
        /// Runtime type name of the rejected value
        type_name: String,
    },

    /// Expectation mismatch
    #[error("Assertion failed for {target}: expected {expected}, but got {actual}")]
    AssertionFailed {
        /// Display string of the asserted target
        target: String,
        /// Expected value
        expected: String,
        /// Observed value
        actual: String,
    },

    /// No element matched the locator
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Locator chain that failed to match
        selector: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Script evaluation error
    #[error("Evaluation failed: {message}")]
    Evaluation {
        /// Error message
        message: String,
    },

    /// Any other driver-level failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Pattern could not be compiled
    #[error("Invalid pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Compiler message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MaestroError {
    /// Build an assertion failure from display-ready parts
    pub fn assertion(
        target: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::AssertionFailed {
            target: target.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Build a generic driver error
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Whether this error came from an expectation mismatch
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }
}
