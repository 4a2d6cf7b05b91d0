//! The `run` command.

use taskline_core::{Output, ProgressDecorator, TaskResult, TaskRunner, Verbosity};

use crate::executor::{CommandTask, ExecutorError};

/// Options of the `run` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Progress message. Defaults to the command line.
    pub message: Option<String>,

    /// Verbosity at which progress lines are written.
    pub level: Verbosity,

    /// Report spawn errors as a failure instead of returning them.
    pub keep_going: bool,

    /// Closing text shown instead of "Done" when the command succeeds.
    pub status_on_success: Option<String>,
}

/// Run `task` through `runner` and return its result.
pub fn run_command<O, D>(
    runner: &TaskRunner<O, D>,
    task: &CommandTask,
    options: &RunOptions,
) -> Result<TaskResult, ExecutorError>
where
    O: Output,
    D: ProgressDecorator,
{
    let message = options
        .message
        .clone()
        .unwrap_or_else(|| task.command_line());

    runner.run_effect(
        &message,
        |context| {
            if options.keep_going {
                context.suppress_errors();
            }
            task.execute(context)?;
            if context.successful == Some(true) {
                if let Some(status) = &options.status_on_success {
                    context.set_status_message(format!("<info>{status}</info>"));
                }
            }
            Ok(())
        },
        options.level,
    )
}

/// Process exit status for a task result.
pub fn exit_code(result: TaskResult) -> u8 {
    match result {
        TaskResult::Success => 0,
        TaskResult::Failure => 1,
    }
}
