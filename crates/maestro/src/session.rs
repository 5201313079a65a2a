//! Authoring sessions and the insertion-target stack.
//!
//! DSL functions are plain calls with no queue parameter. They find where to
//! register themselves through a thread-local stack of capture scopes: the
//! innermost scope receives every command enqueued while it is active.
//!
//! A scope is pushed by [`Session::capture`] for exactly one synchronous body
//! call and popped when the body returns, errors or panics. Step and When
//! bodies run through `capture` at execution time, so each gets its own
//! private list no matter how deeply they nest.

use crate::command::Command;
use crate::config::RunnerConfig;
use crate::context::Context;
use crate::driver::PageDriver;
use crate::reporter::StepReporter;
use crate::result::{MaestroError, MaestroResult};
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

struct Scope {
    session: Session,
    commands: Vec<Command>,
}

thread_local! {
    static SCOPES: RefCell<Vec<Scope>> = const { RefCell::new(Vec::new()) };
}

/// Everything a deferred command needs at run time
///
/// Cheap to clone; commands capture a clone when they are built.
#[derive(Clone)]
pub struct Session {
    page: Arc<dyn PageDriver>,
    context: Context,
    reporter: StepReporter,
    config: Arc<RunnerConfig>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("context", &self.context)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Bundle a page with a run's shared state
    #[must_use]
    pub fn new(
        page: Arc<dyn PageDriver>,
        context: Context,
        reporter: StepReporter,
        config: Arc<RunnerConfig>,
    ) -> Self {
        Self {
            page,
            context,
            reporter,
            config,
        }
    }

    /// Live page handle
    #[must_use]
    pub fn page(&self) -> &Arc<dyn PageDriver> {
        &self.page
    }

    /// Run context
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Step reporter
    #[must_use]
    pub const fn reporter(&self) -> &StepReporter {
        &self.reporter
    }

    /// Run configuration
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Session of the innermost active capture scope on this thread
    pub fn current() -> MaestroResult<Self> {
        SCOPES
            .with(|scopes| scopes.borrow().last().map(|s| s.session.clone()))
            .ok_or(MaestroError::UninitializedEngine)
    }

    /// Whether any capture scope is active on this thread
    #[must_use]
    pub fn is_authoring() -> bool {
        SCOPES.with(|scopes| !scopes.borrow().is_empty())
    }

    /// Run `body` with a fresh private insertion target and return what it
    /// enqueued, in call order
    ///
    /// If `body` fails, the partial capture is discarded and the error is
    /// returned.
    pub fn capture<F>(&self, body: F) -> MaestroResult<Vec<Command>>
    where
        F: FnOnce() -> MaestroResult<()>,
    {
        let guard = ScopeGuard::push(self.clone());
        body()?;
        Ok(guard.finish())
    }

    /// Start a top-level authoring pass
    ///
    /// Fails with [`MaestroError::ReentrantAuthoring`] if a capture is already
    /// active on this thread.
    pub fn capture_root<F>(&self, body: F) -> MaestroResult<Vec<Command>>
    where
        F: FnOnce() -> MaestroResult<()>,
    {
        if Self::is_authoring() {
            return Err(MaestroError::ReentrantAuthoring);
        }
        self.capture(body)
    }
}

/// Append a command to the innermost active capture scope
pub fn enqueue(command: Command) -> MaestroResult<()> {
    SCOPES.with(|scopes| match scopes.borrow_mut().last_mut() {
        Some(scope) => {
            scope.commands.push(command);
            Ok(())
        }
        None => Err(MaestroError::UninitializedEngine),
    })
}

/// Pops its scope on drop unless `finish` already did
struct ScopeGuard {
    depth: usize,
    armed: bool,
}

impl ScopeGuard {
    fn push(session: Session) -> Self {
        let depth = SCOPES.with(|scopes| {
            let mut scopes = scopes.borrow_mut();
            scopes.push(Scope {
                session,
                commands: Vec::new(),
            });
            scopes.len()
        });
        Self { depth, armed: true }
    }

    fn finish(mut self) -> Vec<Command> {
        self.armed = false;
        SCOPES.with(|scopes| {
            let mut scopes = scopes.borrow_mut();
            let popped = if scopes.len() >= self.depth {
                scopes.drain(self.depth - 1..).next()
            } else {
                None
            };
            popped.map(|s| s.commands).unwrap_or_default()
        })
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if self.armed {
            SCOPES.with(|scopes| scopes.borrow_mut().truncate(self.depth - 1));
        }
    }
}
