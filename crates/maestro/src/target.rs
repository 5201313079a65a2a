//! Polymorphic action targets.
//!
//! Every action and assertion accepts one of three addressing styles: a raw
//! selector string, a pre-resolved [`Locator`], or a [`UiComponent`]. The
//! target is resolved once, at the DSL boundary, into an immutable
//! [`ResolvedTarget`] that the deferred command captures.

use crate::component::UiComponent;
use crate::locator::Locator;
use crate::result::{MaestroError, MaestroResult};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Anything an action can be aimed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Selector resolved directly against the page root
    Selector(String),
    /// Locator passed through unchanged
    Locator(Locator),
    /// Component resolved through its ancestor chain
    Component(Arc<UiComponent>),
}

/// A target snapshot ready for a driver call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Driver-actionable locator
    pub locator: Locator,
    /// Display string for reports
    pub description: String,
}

impl Target {
    /// Resolve into a locator plus a display string
    #[must_use]
    pub fn resolve(&self) -> ResolvedTarget {
        match self {
            Self::Selector(selector) => ResolvedTarget {
                locator: Locator::root(selector.clone()),
                description: selector.clone(),
            },
            Self::Locator(locator) => ResolvedTarget {
                locator: locator.clone(),
                description: locator.to_string(),
            },
            Self::Component(component) => ResolvedTarget {
                locator: component.locator(),
                description: component.description(),
            },
        }
    }

    /// Build a target from a dynamically typed value
    ///
    /// Accepts `&str`, `String`, `Locator`, `UiComponent` and
    /// `Arc<UiComponent>`. Anything else is rejected with
    /// [`MaestroError::InvalidTarget`] naming the runtime type.
    pub fn from_any<T: Any>(value: &T) -> MaestroResult<Self> {
        let any = value as &dyn Any;
        if let Some(s) = any.downcast_ref::<&str>() {
            return Ok(Self::Selector((*s).to_string()));
        }
        if let Some(s) = any.downcast_ref::<String>() {
            return Ok(Self::Selector(s.clone()));
        }
        if let Some(locator) = any.downcast_ref::<Locator>() {
            return Ok(Self::Locator(locator.clone()));
        }
        if let Some(component) = any.downcast_ref::<Arc<UiComponent>>() {
            return Ok(Self::Component(Arc::clone(component)));
        }
        if let Some(component) = any.downcast_ref::<UiComponent>() {
            return Ok(Self::Component(Arc::new(component.clone())));
        }
        Err(MaestroError::InvalidTarget {
            type_name: std::any::type_name::<T>().to_string(),
        })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolve().description)
    }
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<&String> for Target {
    fn from(selector: &String) -> Self {
        Self::Selector(selector.clone())
    }
}

impl From<Locator> for Target {
    fn from(locator: Locator) -> Self {
        Self::Locator(locator)
    }
}

impl From<&Locator> for Target {
    fn from(locator: &Locator) -> Self {
        Self::Locator(locator.clone())
    }
}

impl From<Arc<UiComponent>> for Target {
    fn from(component: Arc<UiComponent>) -> Self {
        Self::Component(component)
    }
}

impl From<&Arc<UiComponent>> for Target {
    fn from(component: &Arc<UiComponent>) -> Self {
        Self::Component(Arc::clone(component))
    }
}

impl From<UiComponent> for Target {
    fn from(component: UiComponent) -> Self {
        Self::Component(Arc::new(component))
    }
}

impl From<&UiComponent> for Target {
    fn from(component: &UiComponent) -> Self {
        Self::Component(Arc::new(component.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_resolves_at_root() {
        let resolved = Target::from(".new-todo").resolve();
        assert_eq!(resolved.locator, Locator::root(".new-todo"));
        assert_eq!(resolved.description, ".new-todo");
    }

    #[test]
    fn test_locator_passes_through() {
        let loc = Locator::root("ul").locator("li");
        let resolved = Target::from(&loc).resolve();
        assert_eq!(resolved.locator, loc);
        assert_eq!(resolved.description, "ul >> li");
    }

    #[test]
    fn test_component_resolves_through_parents() {
        let app = UiComponent::new("App", ".todoapp").shared();
        let list = UiComponent::child_of("List", ".todo-list", &app).shared();
        let resolved = Target::from(&list).resolve();
        assert_eq!(resolved.locator.selectors(), &[".todoapp", ".todo-list"]);
        assert_eq!(resolved.description, "[App > List]");
    }

    mod from_any_tests {
        use super::*;

        #[test]
        fn test_accepts_supported_types() {
            assert!(matches!(Target::from_any(&"a"), Ok(Target::Selector(_))));
            assert!(matches!(
                Target::from_any(&"a".to_string()),
                Ok(Target::Selector(_))
            ));
            assert!(matches!(
                Target::from_any(&Locator::root("a")),
                Ok(Target::Locator(_))
            ));
            let component = UiComponent::new("A", "a");
            assert!(matches!(
                Target::from_any(&component),
                Ok(Target::Component(_))
            ));
            assert!(matches!(
                Target::from_any(&component.shared()),
                Ok(Target::Component(_))
            ));
        }

        #[test]
        fn test_rejects_other_types_with_name() {
            let err = Target::from_any(&42_u32).unwrap_err();
            match err {
                MaestroError::InvalidTarget { type_name } => assert_eq!(type_name, "u32"),
                other => panic!("unexpected error: {other}"),
            }
            let err = Target::from_any(&vec![1_u8]).unwrap_err();
            assert!(err.to_string().contains("Vec<u8>"));
        }
    }
}
