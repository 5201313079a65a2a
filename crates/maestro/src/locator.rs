//! Locator: a resolved, driver-actionable chain of scoped selectors.
//!
//! A locator is pure data. It starts at the page root and narrows through each
//! selector in turn, every lookup performed *within* the previous result:
//!
//! ```text
//!   page ──locate(".todoapp")──► scope ──locate(".todo-list")──► elements
//! ```
//!
//! Drivers interpret the chain; the chain itself never touches a live page, so
//! resolving the same target twice always yields equal locators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used when displaying a locator chain
pub const CHAIN_SEPARATOR: &str = " >> ";

/// A root-to-leaf chain of selectors
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    chain: Vec<String>,
}

impl Locator {
    /// Locate `selector` against the page root
    #[must_use]
    pub fn root(selector: impl Into<String>) -> Self {
        Self {
            chain: vec![selector.into()],
        }
    }

    /// Locate `selector` scoped within this locator's matches
    #[must_use]
    pub fn locator(&self, selector: impl Into<String>) -> Self {
        let mut chain = self.chain.clone();
        chain.push(selector.into());
        Self { chain }
    }

    /// Selectors from root to leaf
    #[must_use]
    pub fn selectors(&self) -> &[String] {
        &self.chain
    }

    /// JavaScript expression yielding every element matched by the chain
    ///
    /// Each selector is applied with `querySelectorAll` inside every element
    /// matched so far, starting from `document`.
    #[must_use]
    pub fn to_query_all(&self) -> String {
        let selectors = serde_json::to_string(&self.chain).unwrap_or_else(|_| "[]".to_string());
        format!(
            "{selectors}.reduce((scopes, sel) => scopes.flatMap(s => Array.from(s.querySelectorAll(sel))), [document])"
        )
    }

    /// JavaScript expression yielding the first matched element or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("({}[0] ?? null)", self.to_query_all())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.chain.join(CHAIN_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_locator() {
        let loc = Locator::root(".todoapp");
        assert_eq!(loc.selectors(), &[".todoapp".to_string()]);
    }

    #[test]
    fn test_nested_locator_scopes_inside_parent() {
        let parent = Locator::root(".todoapp");
        let child = parent.locator(".todo-list");
        assert_eq!(child.selectors(), &[".todoapp", ".todo-list"]);
        assert_eq!(child.to_string(), ".todoapp >> .todo-list");
        // parent untouched
        assert_eq!(parent.selectors().len(), 1);
    }

    #[test]
    fn test_query_generation() {
        let loc = Locator::root(".todoapp").locator("[data-testid=\"todo-title\"]");
        let all = loc.to_query_all();
        assert!(all.starts_with("[\".todoapp\",\"[data-testid=\\\"todo-title\\\"]\"]"));
        assert!(all.contains("querySelectorAll(sel)"));
        assert!(loc.to_query().ends_with("[0] ?? null)"));
    }
}
