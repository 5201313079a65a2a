//! Maestro: Declarative, Deferred Step Authoring for Browser UI Tests
//!
//! Test authors describe a sequence of user-facing actions and assertions as
//! plain function calls. Each call only *enqueues* a labelled command; the
//! queue runs afterwards, strictly in order, against a live page.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       MAESTRO Architecture                       │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐             │
//! │   │ Author fn  │    │ Command    │    │ PageDriver │             │
//! │   │ (DSL calls)│───►│ Runner     │───►│ (chromium  │             │
//! │   │            │    │ (in order) │    │  or mock)  │             │
//! │   └────────────┘    └────────────┘    └────────────┘             │
//! │         │ step / when capture private sub-queues                 │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use maestro::prelude::*;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> MaestroResult<()> {
//! let app = UiComponent::new("Todo App", ".todoapp").shared();
//! let input = UiComponent::child_of("Todo Input", ".new-todo", &app).shared();
//!
//! let page = Arc::new(MockDriver::new());
//! let report = TestContext::new(page.clone())
//!     .at_page("https://example.test/todo", || {
//!         enter("Buy milk").into(&input)?;
//!         press_enter_on(&input)
//!     })
//!     .await?;
//!
//! assert_eq!(report.commands_executed, 3);
//! assert_eq!(page.history()[1], "fill:.todoapp >> .new-todo:Buy milk");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod assertion;
#[cfg(feature = "browser")]
mod browser;
mod command;
mod component;
mod config;
mod context;
mod driver;
pub mod dsl;
mod harness;
mod locator;
pub mod logging;
mod page_object;
mod reporter;
mod result;
mod runner;
mod session;
mod target;
mod wait;

pub use assertion::{values_equal, Assertion, AssertionResult, UNDEFINED};
#[cfg(feature = "browser")]
pub use browser::{ChromiumConfig, ChromiumDriver};
pub use command::Command;
pub use component::{ComponentSelector, UiComponent};
pub use config::{RunnerConfig, RunnerConfigBuilder, DEFAULT_MAX_PARAM_CHARS};
pub use context::Context;
pub use driver::{MockDriver, MockElement, PageDriver};
pub use harness::{at_page, steps, RunReport, TestContext};
pub use locator::{Locator, CHAIN_SEPARATOR};
pub use logging::{init_logging, LOG_ENV_VAR};
pub use page_object::{PageObject, SimplePage};
pub use reporter::{ReportTrail, StepRecord, StepReporter, StepStatus, TrailMetadata};
pub use result::{MaestroError, MaestroResult};
pub use runner::CommandRunner;
pub use session::{enqueue, Session};
pub use target::{ResolvedTarget, Target};
pub use wait::{UrlPattern, WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::dsl::*;
    #[cfg(feature = "browser")]
    pub use super::{ChromiumConfig, ChromiumDriver};
    pub use super::{
        at_page, steps, Context, Locator, MaestroError, MaestroResult, MockDriver, MockElement,
        PageDriver, PageObject, RunReport, RunnerConfig, SimplePage, Target, TestContext,
        UiComponent, UrlPattern, WaitOptions,
    };
}
