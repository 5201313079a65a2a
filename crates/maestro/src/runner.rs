//! Command Runner
//!
//! Holds the outer command queue and the run's [`Context`], and drains the
//! queue exactly once, front to back. Each command is awaited to completion
//! before the next starts; the first error aborts everything after it.

use crate::command::Command;
use crate::context::Context;
use crate::reporter::StepReporter;
use crate::result::MaestroResult;
use serde_json::Value;

/// Ordered queue of deferred commands plus the run's context
#[derive(Debug)]
pub struct CommandRunner {
    queue: Vec<Command>,
    context: Context,
    reporter: StepReporter,
    log_commands: bool,
}

impl CommandRunner {
    /// Create an empty runner
    #[must_use]
    pub fn new(context: Context, reporter: StepReporter) -> Self {
        Self {
            queue: Vec::new(),
            context,
            reporter,
            log_commands: true,
        }
    }

    /// Enable/disable the per-command debug event
    #[must_use]
    pub const fn with_command_logging(mut self, enabled: bool) -> Self {
        self.log_commands = enabled;
        self
    }

    /// Append a command
    pub fn add(&mut self, command: Command) {
        self.queue.push(command);
    }

    /// Number of queued commands
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Labels of queued commands, in execution order
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.queue.iter().map(Command::label).collect()
    }

    /// Store a context value
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.context.set(name, value);
    }

    /// Read a context value
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.context.get(name)
    }

    /// Run context
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Drain the queue; returns how many top-level commands ran
    pub async fn run(self) -> MaestroResult<usize> {
        drain(self.queue, &self.reporter, self.log_commands).await
    }
}

/// Await `commands` one after another under `reporter`
///
/// Shared by the outer runner and by Step/When bodies replaying their
/// captured sub-queue.
pub(crate) async fn drain(
    commands: Vec<Command>,
    reporter: &StepReporter,
    log_commands: bool,
) -> MaestroResult<usize> {
    let total = commands.len();
    for (index, command) in commands.into_iter().enumerate() {
        let label = command.label().to_string();
        if log_commands {
            tracing::debug!(index, total, command = %label, "executing command");
        }
        if let Err(err) = command.execute(reporter).await {
            tracing::error!(command = %label, error = %err, "command failed, aborting run");
            return Err(err);
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::MaestroError;
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    fn logging_command(log: &Arc<Mutex<Vec<usize>>>, marker: usize) -> Command {
        let log = Arc::clone(log);
        Command::new(format!("mark {marker}"), async move {
            log.lock().unwrap().push(marker);
            Ok(())
        })
    }

    fn runner() -> CommandRunner {
        CommandRunner::new(Context::new(), StepReporter::new("t"))
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_empty_run() {
            assert_eq!(runner().run().await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_runs_in_insertion_order() {
            let log = Arc::new(Mutex::new(Vec::new()));
            let mut runner = runner();
            for i in 0..5 {
                runner.add(logging_command(&log, i));
            }
            assert_eq!(runner.labels()[0], "mark 0");
            assert_eq!(runner.run().await.unwrap(), 5);
            assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        }

        #[tokio::test]
        async fn test_failure_aborts_remaining() {
            let log = Arc::new(Mutex::new(Vec::new()));
            let reporter = StepReporter::new("t");
            let mut runner = CommandRunner::new(Context::new(), reporter.clone());
            runner.add(logging_command(&log, 1));
            runner.add(Command::new("explode", async {
                Err(MaestroError::ElementNotFound {
                    selector: ".gone".into(),
                })
            }));
            runner.add(logging_command(&log, 3));

            let err = runner.run().await.unwrap_err();
            assert!(matches!(err, MaestroError::ElementNotFound { .. }));
            assert_eq!(*log.lock().unwrap(), vec![1]);
            assert_eq!(reporter.failed_step().unwrap().title, "explode");
            assert_eq!(reporter.titles(), vec!["mark 1", "explode"]);
        }

        #[tokio::test]
        async fn test_command_sees_previous_state() {
            let mut runner = runner();
            let ctx = runner.context().clone();
            let writer = ctx.clone();
            runner.add(Command::new("write", async move {
                writer.set("n", serde_json::json!(1));
                Ok(())
            }));
            runner.add(Command::new("read", async move {
                match ctx.get("n") {
                    Some(_) => Ok(()),
                    None => Err(MaestroError::assertion("n", "defined", "undefined")),
                }
            }));
            runner.run().await.unwrap();
        }
    }

    mod context_tests {
        use super::*;

        #[test]
        fn test_set_get() {
            let runner = runner();
            runner.set("todo", serde_json::json!("milk"));
            assert_eq!(runner.get("todo"), Some(serde_json::json!("milk")));
            assert_eq!(runner.get("missing"), None);
        }
    }

    proptest! {
        #[test]
        fn prop_ordering_invariant(count in 0usize..40) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let log = Arc::new(Mutex::new(Vec::new()));
            let mut runner = runner().with_command_logging(false);
            for i in 0..count {
                runner.add(logging_command(&log, i));
            }
            let executed = rt.block_on(runner.run()).unwrap();
            prop_assert_eq!(executed, count);
            prop_assert_eq!(log.lock().unwrap().clone(), (0..count).collect::<Vec<_>>());
        }
    }
}
