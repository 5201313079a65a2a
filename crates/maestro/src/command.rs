//! Deferred commands.
//!
//! A command is a labelled, not-yet-polled future. Async blocks do nothing
//! until awaited, so building a command at authoring time captures the
//! target and parameters without touching the page.

use crate::reporter::StepReporter;
use crate::result::MaestroResult;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;

/// A deferred asynchronous operation with a report label
pub struct Command {
    label: String,
    action: BoxFuture<'static, MaestroResult<()>>,
}

impl Command {
    /// Wrap a future as a command
    pub fn new<F>(label: impl Into<String>, action: F) -> Self
    where
        F: Future<Output = MaestroResult<()>> + Send + 'static,
    {
        Self {
            label: label.into(),
            action: action.boxed(),
        }
    }

    /// Report label
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run the command once, inside its own reporting scope
    pub async fn execute(self, reporter: &StepReporter) -> MaestroResult<()> {
        let Self { label, action } = self;
        reporter.scope(&label, action).await
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_construction_does_not_run() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let command = Command::new("count", async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(command.label(), "count");

        command.execute(&StepReporter::new("t")).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_debug_shows_label() {
        let command = Command::new("Clicking on element: .x", async { Ok(()) });
        assert!(format!("{command:?}").contains("Clicking on element: .x"));
    }
}
