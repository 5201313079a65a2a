//! Test bootstrap.
//!
//! [`TestContext`] wires a page into a fresh context, reporter and runner,
//! runs the author's function once to build the queue, then drains it.
//!
//! ```no_run
//! use maestro::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn demo(page: Arc<dyn PageDriver>) -> MaestroResult<()> {
//! let report = TestContext::new(page)
//!     .at_page("https://demo.playwright.dev/todomvc", || {
//!         enter("Buy milk").into(".new-todo")?;
//!         press_enter_on(".new-todo")?;
//!         expect(".todo-list li").count_is(1)
//!     })
//!     .await?;
//! assert_eq!(report.commands_executed, 4);
//! # Ok(())
//! # }
//! ```

use crate::config::RunnerConfig;
use crate::context::Context;
use crate::driver::PageDriver;
use crate::dsl::goto;
use crate::page_object::PageObject;
use crate::reporter::{StepRecord, StepReporter};
use crate::result::MaestroResult;
use crate::runner::CommandRunner;
use crate::session::Session;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of a fully drained run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Test name
    pub test_name: String,
    /// Top-level commands executed
    pub commands_executed: usize,
    /// Every reporting scope, in start order
    pub records: Vec<StepRecord>,
    /// Context at the end of the run
    pub context: HashMap<String, Value>,
    /// Wall time of authoring plus execution
    pub duration: Duration,
}

impl RunReport {
    /// First record with exactly this title
    #[must_use]
    pub fn record_titled(&self, title: &str) -> Option<&StepRecord> {
        self.records.iter().find(|r| r.title == title)
    }

    /// Titles of every record, in start order
    #[must_use]
    pub fn titles(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.title.as_str()).collect()
    }
}

/// Per-test bootstrap: page, context, reporter and configuration
pub struct TestContext {
    name: String,
    page: Arc<dyn PageDriver>,
    context: Context,
    reporter: StepReporter,
    config: RunnerConfig,
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TestContext {
    /// Fresh context for `page`
    #[must_use]
    pub fn new(page: Arc<dyn PageDriver>) -> Self {
        Self {
            name: "maestro".to_string(),
            page,
            context: Context::new(),
            reporter: StepReporter::default(),
            config: RunnerConfig::default(),
        }
    }

    /// Name the test (used in the report trail)
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self.reporter = StepReporter::new(&self.name);
        self
    }

    /// Replace the run configuration
    #[must_use]
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Reporter handle; stays readable after a failed run
    #[must_use]
    pub const fn reporter(&self) -> &StepReporter {
        &self.reporter
    }

    /// Context handle
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Navigate to `url`, then run everything `author` enqueues
    pub async fn at_page<F>(self, url: impl Into<String>, author: F) -> MaestroResult<RunReport>
    where
        F: FnOnce() -> MaestroResult<()>,
    {
        let url = url.into();
        self.execute(move || {
            goto(url)?;
            author()
        })
        .await
    }

    /// Bootstrap at a page object's URL
    pub async fn at<P, F>(self, page: &P, author: F) -> MaestroResult<RunReport>
    where
        P: PageObject + ?Sized,
        F: FnOnce() -> MaestroResult<()>,
    {
        tracing::debug!(page = page.page_name(), "bootstrapping at page object");
        let url = page.url().to_string();
        self.at_page(url, author).await
    }

    /// Run everything `author` enqueues, without an initial navigation
    pub async fn steps<F>(self, author: F) -> MaestroResult<RunReport>
    where
        F: FnOnce() -> MaestroResult<()>,
    {
        self.execute(author).await
    }

    async fn execute<F>(self, author: F) -> MaestroResult<RunReport>
    where
        F: FnOnce() -> MaestroResult<()>,
    {
        let started = Instant::now();
        let Self {
            name,
            page,
            context,
            reporter,
            config,
        } = self;

        let log_commands = config.log_commands;
        let session = Session::new(page, context.clone(), reporter.clone(), Arc::new(config));
        let mut runner = CommandRunner::new(context.clone(), reporter.clone())
            .with_command_logging(log_commands);
        for command in session.capture_root(author)? {
            runner.add(command);
        }

        tracing::info!(test = %name, commands = runner.len(), "running authored commands");
        let commands_executed = runner.run().await?;

        Ok(RunReport {
            test_name: name,
            commands_executed,
            records: reporter.records(),
            context: context.snapshot(),
            duration: started.elapsed(),
        })
    }
}

/// Bootstrap `page` at `url` and run `author`'s commands
pub async fn at_page<F>(
    page: Arc<dyn PageDriver>,
    url: impl Into<String>,
    author: F,
) -> MaestroResult<RunReport>
where
    F: FnOnce() -> MaestroResult<()>,
{
    TestContext::new(page).at_page(url, author).await
}

/// Run `author`'s commands against `page` as one test body
pub async fn steps<F>(page: Arc<dyn PageDriver>, author: F) -> MaestroResult<RunReport>
where
    F: FnOnce() -> MaestroResult<()>,
{
    TestContext::new(page).steps(author).await
}
