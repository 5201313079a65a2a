//! Composite and conditional commands.
//!
//! A [`step`] or [`when`] occupies a single slot in the enclosing queue. Its
//! body is only called when that slot runs: the body's DSL calls land in a
//! private capture, which is then drained in order inside the slot's report
//! scope. A `when` whose condition is false never calls its body, so none of
//! the body's commands ever exist.

use crate::assertion::values_equal;
use crate::command::Command;
use crate::context::Context;
use crate::result::MaestroResult;
use crate::runner::drain;
use crate::session::{enqueue, Session};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Report label of every conditional block
pub const WHEN_LABEL: &str = "Executing conditional block if condition is met";

/// Capture `body` into a private queue, then run it
async fn run_captured<F>(session: Session, body: F) -> MaestroResult<()>
where
    F: FnOnce() -> MaestroResult<()>,
{
    let commands = session.capture(body)?;
    drain(commands, session.reporter(), session.config().log_commands).await?;
    Ok(())
}

type StepBody<P> = dyn Fn(&P) -> MaestroResult<()> + Send + Sync;

/// A named, reusable group of DSL calls, see [`step`]
pub struct StepFn<P> {
    name: Arc<str>,
    body: Arc<StepBody<P>>,
}

impl<P> Clone for StepFn<P> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            body: Arc::clone(&self.body),
        }
    }
}

impl<P> fmt::Debug for StepFn<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepFn")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Define a step
///
/// ```no_run
/// use maestro::prelude::*;
///
/// # fn todo_input() -> Target { Target::from(".new-todo") }
/// let add_item = step("Add Item", |item: &String| {
///     enter(item.as_str()).into(todo_input())?;
///     press_enter_on(todo_input())
/// });
/// # let _ = add_item;
/// ```
pub fn step<P, F>(name: impl Into<String>, body: F) -> StepFn<P>
where
    F: Fn(&P) -> MaestroResult<()> + Send + Sync + 'static,
{
    StepFn {
        name: Arc::from(name.into()),
        body: Arc::new(body),
    }
}

impl<P> StepFn<P>
where
    P: Serialize + Clone + Send + Sync + 'static,
{
    /// Step name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue one run of this step with `params`; returns `params`
    ///
    /// The body is not called here. It runs when the enqueued command runs,
    /// receiving a copy of `params`.
    pub fn call(&self, params: P) -> MaestroResult<P> {
        let session = Session::current()?;
        let rendered = serde_json::to_value(&params)?;
        let title = session.config().step_title(&self.name, &rendered);
        let body = Arc::clone(&self.body);
        let captured = params.clone();
        enqueue(Command::new(
            title,
            run_captured(session, move || body(&captured)),
        ))?;
        Ok(params)
    }
}

impl StepFn<()> {
    /// Enqueue a parameterless step
    pub fn run(&self) -> MaestroResult<()> {
        self.call(())
    }
}

/// Run `body` only if `predicate` holds for the context at run time
pub fn when<C, B>(predicate: C, body: B) -> MaestroResult<()>
where
    C: FnOnce(&Context) -> bool + Send + 'static,
    B: FnOnce() -> MaestroResult<()> + Send + 'static,
{
    let session = Session::current()?;
    enqueue(Command::new(WHEN_LABEL, async move {
        if predicate(session.context()) {
            run_captured(session, body).await
        } else {
            tracing::debug!("condition not met, skipping block");
            Ok(())
        }
    }))
}

/// Like [`when`], with an asynchronous predicate
///
/// The predicate receives a clone of the context handle; an error from it
/// fails the command.
pub fn when_async<C, Fut, B>(predicate: C, body: B) -> MaestroResult<()>
where
    C: FnOnce(Context) -> Fut + Send + 'static,
    Fut: Future<Output = MaestroResult<bool>> + Send + 'static,
    B: FnOnce() -> MaestroResult<()> + Send + 'static,
{
    let session = Session::current()?;
    enqueue(Command::new(WHEN_LABEL, async move {
        if predicate(session.context().clone()).await? {
            run_captured(session, body).await
        } else {
            tracing::debug!("condition not met, skipping block");
            Ok(())
        }
    }))
}

/// Run `body` only if the context value under `key` equals `expected`
pub fn when_context_equals<B>(
    key: impl Into<String>,
    expected: impl Serialize,
    body: B,
) -> MaestroResult<()>
where
    B: FnOnce() -> MaestroResult<()> + Send + 'static,
{
    let key = key.into();
    let expected = serde_json::to_value(expected)?;
    when(
        move |context| {
            context
                .get(&key)
                .is_some_and(|actual| values_equal(&expected, &actual))
        },
        body,
    )
}
