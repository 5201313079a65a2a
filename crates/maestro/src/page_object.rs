//! Page Object Model Support
//!
//! A page object names a page, says where it lives, and owns the UI
//! components tests address on it. [`crate::TestContext::at`] navigates to a
//! page object's URL before running the authored steps.

use crate::component::UiComponent;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Trait for page objects representing a page in the UI.
///
/// # Example
///
/// ```
/// use maestro::{PageObject, UiComponent};
/// use std::sync::Arc;
///
/// struct TodoPage {
///     app: Arc<UiComponent>,
/// }
///
/// impl PageObject for TodoPage {
///     fn url(&self) -> &str {
///         "https://demo.playwright.dev/todomvc"
///     }
/// }
///
/// let page = TodoPage { app: UiComponent::new("Todo App", ".todoapp").shared() };
/// assert_eq!(page.url(), "https://demo.playwright.dev/todomvc");
/// assert!(page.page_name().ends_with("TodoPage"));
/// # let _ = page.app;
/// ```
pub trait PageObject {
    /// Absolute URL of the page
    fn url(&self) -> &str;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A simple generic page object: name, URL and named components
#[derive(Debug, Clone, Default)]
pub struct SimplePage {
    name: String,
    url: String,
    components: HashMap<String, Arc<UiComponent>>,
}

impl SimplePage {
    /// Create a page with no components
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            components: HashMap::new(),
        }
    }

    /// Register a component under its own name
    #[must_use]
    pub fn with_component(mut self, component: &Arc<UiComponent>) -> Self {
        let _ = self
            .components
            .insert(component.name().to_string(), Arc::clone(component));
        self
    }

    /// Look up a registered component by name
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&Arc<UiComponent>> {
        self.components.get(name)
    }

    /// Names of registered components, sorted
    #[must_use]
    pub fn component_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl PageObject for SimplePage {
    fn url(&self) -> &str {
        &self.url
    }

    fn page_name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for SimplePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod simple_page_tests {
        use super::*;

        fn todo_page() -> SimplePage {
            let app = UiComponent::new("Todo App Section", ".todoapp").shared();
            let input = UiComponent::child_of(
                "Todo Input",
                "[placeholder=\"What needs to be done?\"]",
                &app,
            )
            .shared();
            SimplePage::new("TodoMVC", "https://demo.playwright.dev/todomvc")
                .with_component(&app)
                .with_component(&input)
        }

        #[test]
        fn test_page_identity() {
            let page = todo_page();
            assert_eq!(page.url(), "https://demo.playwright.dev/todomvc");
            assert_eq!(page.page_name(), "TodoMVC");
            assert_eq!(page.to_string(), "TodoMVC");
        }

        #[test]
        fn test_component_lookup() {
            let page = todo_page();
            assert_eq!(page.component_names(), vec!["Todo App Section", "Todo Input"]);
            let input = page.component("Todo Input").unwrap();
            assert_eq!(input.description(), "[Todo App Section > Todo Input]");
            assert!(page.component("Missing").is_none());
        }

        #[test]
        fn test_default_page_name_is_type_name() {
            struct Bare;
            impl PageObject for Bare {
                fn url(&self) -> &str {
                    "about:blank"
                }
            }
            assert!(Bare.page_name().ends_with("Bare"));
        }
    }
}
