//! UiComponent: a named, optionally parented handle to a page element.
//!
//! Components are built once when a page object is defined and are shared by
//! reference (`Arc`) across every action and assertion. A component is a back
//! reference to a DOM location; it never owns a live element.
//!
//! The parent relation is fixed at construction and parents must already
//! exist, so the hierarchy is always a tree.

use crate::locator::Locator;
use std::fmt;
use std::sync::Arc;

/// What a component points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentSelector {
    /// Selector string understood by the driver
    Css(String),
    /// Pre-resolved locator, used as-is
    Locator(Locator),
}

impl From<&str> for ComponentSelector {
    fn from(selector: &str) -> Self {
        Self::Css(selector.to_string())
    }
}

impl From<String> for ComponentSelector {
    fn from(selector: String) -> Self {
        Self::Css(selector)
    }
}

impl From<Locator> for ComponentSelector {
    fn from(locator: Locator) -> Self {
        Self::Locator(locator)
    }
}

/// A logical UI element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiComponent {
    name: String,
    selector: ComponentSelector,
    parent: Option<Arc<UiComponent>>,
}

impl UiComponent {
    /// Create a top-level component
    #[must_use]
    pub fn new(name: impl Into<String>, selector: impl Into<ComponentSelector>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            parent: None,
        }
    }

    /// Create a component nested inside `parent`
    #[must_use]
    pub fn child_of(
        name: impl Into<String>,
        selector: impl Into<ComponentSelector>,
        parent: &Arc<Self>,
    ) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            parent: Some(Arc::clone(parent)),
        }
    }

    /// Wrap in an `Arc` for sharing across call sites
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Human-readable label
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Own selector (not the resolved chain)
    #[must_use]
    pub const fn selector(&self) -> &ComponentSelector {
        &self.selector
    }

    /// Parent component, if nested
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Components from the root ancestor down to `self`
    #[must_use]
    pub fn lineage(&self) -> Vec<&Self> {
        let mut chain = vec![self];
        let mut current = self.parent.as_deref();
        while let Some(component) = current {
            chain.push(component);
            current = component.parent.as_deref();
        }
        chain.reverse();
        chain
    }

    /// Resolve to a locator scoped through every ancestor
    ///
    /// Selectors are applied root to leaf. A pre-resolved locator anywhere in
    /// the lineage restarts the chain from that locator, since it is already
    /// anchored at the page root.
    #[must_use]
    pub fn locator(&self) -> Locator {
        let mut resolved: Option<Locator> = None;
        for component in self.lineage() {
            resolved = Some(match (&component.selector, resolved) {
                (ComponentSelector::Locator(locator), _) => locator.clone(),
                (ComponentSelector::Css(css), None) => Locator::root(css.clone()),
                (ComponentSelector::Css(css), Some(scope)) => scope.locator(css.clone()),
            });
        }
        // lineage always contains self
        resolved.unwrap_or_else(|| Locator::root(""))
    }

    /// Display string used in reports
    ///
    /// Top-level components report their own name; nested ones report the
    /// bracketed chain, e.g. `[Todo App Section > Todo List Section]`.
    #[must_use]
    pub fn description(&self) -> String {
        if self.parent.is_none() {
            return self.name.clone();
        }
        let names: Vec<&str> = self.lineage().into_iter().map(|c| c.name.as_str()).collect();
        format!("[{}]", names.join(" > "))
    }
}

impl fmt::Display for UiComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn todo_tree() -> (Arc<UiComponent>, Arc<UiComponent>, Arc<UiComponent>) {
        let app = UiComponent::new("Todo App Section", ".todoapp").shared();
        let list = UiComponent::child_of("Todo List Section", ".todo-list", &app).shared();
        let title =
            UiComponent::child_of("Todo Title", "[data-testid=\"todo-title\"]", &list).shared();
        (app, list, title)
    }

    mod resolution_tests {
        use super::*;

        #[test]
        fn test_single_level_resolves_against_root() {
            let (app, _, _) = todo_tree();
            assert_eq!(app.locator(), Locator::root(".todoapp"));
            assert_eq!(app.description(), "Todo App Section");
        }

        #[test]
        fn test_child_scoped_inside_parent() {
            let (_, list, _) = todo_tree();
            let loc = list.locator();
            assert_eq!(loc, Locator::root(".todoapp").locator(".todo-list"));
            assert_ne!(loc, Locator::root(".todo-list"));
            assert_eq!(list.description(), "[Todo App Section > Todo List Section]");
        }

        #[test]
        fn test_three_levels() {
            let (_, _, title) = todo_tree();
            assert_eq!(
                title.locator().selectors(),
                &[".todoapp", ".todo-list", "[data-testid=\"todo-title\"]"]
            );
            assert_eq!(
                title.to_string(),
                "[Todo App Section > Todo List Section > Todo Title]"
            );
        }

        #[test]
        fn test_pre_resolved_locator_restarts_chain() {
            let anchored = UiComponent::new(
                "Footer",
                Locator::root("body").locator("footer"),
            )
            .shared();
            let link = UiComponent::child_of("Clear", "button.clear-completed", &anchored);
            assert_eq!(link.locator().to_string(), "body >> footer >> button.clear-completed");
        }

        #[test]
        fn test_resolution_is_idempotent() {
            let (_, _, title) = todo_tree();
            assert_eq!(title.locator(), title.locator());
            assert_eq!(title.description(), title.description());
        }

        #[test]
        fn test_lineage_order() {
            let (_, _, title) = todo_tree();
            let names: Vec<&str> = title.lineage().into_iter().map(|c| c.name()).collect();
            assert_eq!(names, vec!["Todo App Section", "Todo List Section", "Todo Title"]);
        }
    }

    proptest! {
        #[test]
        fn prop_chain_matches_lineage(selectors in proptest::collection::vec("[a-z.#-]{1,12}", 1..6)) {
            let mut component = UiComponent::new("c0", selectors[0].as_str()).shared();
            for (i, sel) in selectors.iter().enumerate().skip(1) {
                component = UiComponent::child_of(format!("c{i}"), sel.as_str(), &component).shared();
            }
            let first = component.locator();
            prop_assert_eq!(first.selectors(), selectors.as_slice());
            prop_assert_eq!(first, component.locator());
        }
    }
}
