//! Task execution with progress reporting.

use crate::decorator::{ProgressDecorator, SimpleProgressDecorator};
use crate::output::{BufferedOutput, Output};
use crate::{RunnerContext, TaskResult, Verbosity};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// What [`TaskRunner::run`] returns for a value-producing task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The task returned this value.
    Value(T),
    /// The task raised an error and asked for it to be suppressed. The task
    /// result is [`TaskResult::Failure`].
    Suppressed,
}

impl<T> Outcome<T> {
    /// The returned value, or `None` if the error was suppressed.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Suppressed => None,
        }
    }

    /// Returns true if the task failed with a suppressed error.
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed)
    }
}

/// How a single invocation ended, before it is shaped for the caller.
enum Finished<T> {
    Returned(T, TaskResult),
    Suppressed,
}

/// Runs tasks between a progress line and a closing status line.
///
/// ```
/// use taskline_core::{BufferedOutput, TaskResult, TaskRunner, Verbosity};
///
/// let runner = TaskRunner::new(BufferedOutput::new());
/// let result = runner
///     .run_effect("Let's go", |_| Ok::<_, std::io::Error>(()), Verbosity::Normal)
///     .unwrap();
///
/// assert_eq!(result, TaskResult::Success);
/// assert_eq!(runner.output().fetch(), "Let's go... Done\n");
/// ```
///
/// Output the task writes to its context is held back and written after the
/// closing line, so `"<message>... Done"` is never interrupted.
#[derive(Debug)]
pub struct TaskRunner<O, D = SimpleProgressDecorator> {
    output: O,
    decorator: D,
}

impl<O: Output> TaskRunner<O> {
    /// Runner with the default decorator.
    pub fn new(output: O) -> Self {
        Self::with_decorator(output, SimpleProgressDecorator)
    }
}

impl<O: Output, D: ProgressDecorator> TaskRunner<O, D> {
    /// Runner with a custom decorator.
    pub fn with_decorator(output: O, decorator: D) -> Self {
        Self { output, decorator }
    }

    /// The destination this runner writes to.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// The decorator formatting progress and closing lines.
    pub fn decorator(&self) -> &D {
        &self.decorator
    }

    /// Run a task that produces a value.
    ///
    /// Returns the value on normal completion, whatever verdict the task left
    /// in its context. A task error is returned unchanged, unless the task
    /// called [`RunnerContext::suppress_errors`], in which case
    /// [`Outcome::Suppressed`] is returned.
    ///
    /// Panics inside the task follow the same rules: the closing line is
    /// written, the captured output flushed, and the panic resumed unless
    /// suppressed. The process panic hook still runs before the runner sees
    /// the panic, so a suppressed panic is reported on stderr by the default
    /// hook. Install a quieter hook with [`std::panic::set_hook`] if needed.
    pub fn run<T, E, F>(
        &self,
        message: &str,
        task: F,
        verbosity: Verbosity,
    ) -> Result<Outcome<T>, E>
    where
        T: 'static,
        E: fmt::Display,
        F: FnOnce(&mut RunnerContext) -> Result<T, E>,
    {
        match self.execute(message, task, verbosity)? {
            Finished::Returned(value, _) => Ok(Outcome::Value(value)),
            Finished::Suppressed => Ok(Outcome::Suppressed),
        }
    }

    /// Run a task that produces no value and return its [`TaskResult`].
    ///
    /// A suppressed error yields [`TaskResult::Failure`]. Panics are handled
    /// as described on [`run`](Self::run), including the panic hook output.
    pub fn run_effect<E, F>(
        &self,
        message: &str,
        task: F,
        verbosity: Verbosity,
    ) -> Result<TaskResult, E>
    where
        E: fmt::Display,
        F: FnOnce(&mut RunnerContext) -> Result<(), E>,
    {
        match self.execute(message, task, verbosity)? {
            Finished::Returned((), result) => Ok(result),
            Finished::Suppressed => Ok(TaskResult::Failure),
        }
    }

    /// [`run`](Self::run) at [`Verbosity::Normal`].
    pub fn run_normal<T, E, F>(&self, message: &str, task: F) -> Result<Outcome<T>, E>
    where
        T: 'static,
        E: fmt::Display,
        F: FnOnce(&mut RunnerContext) -> Result<T, E>,
    {
        self.run(message, task, Verbosity::Normal)
    }

    /// [`run_effect`](Self::run_effect) at [`Verbosity::Normal`].
    pub fn run_effect_normal<E, F>(&self, message: &str, task: F) -> Result<TaskResult, E>
    where
        E: fmt::Display,
        F: FnOnce(&mut RunnerContext) -> Result<(), E>,
    {
        self.run_effect(message, task, Verbosity::Normal)
    }

    fn execute<T, E, F>(
        &self,
        message: &str,
        task: F,
        verbosity: Verbosity,
    ) -> Result<Finished<T>, E>
    where
        T: 'static,
        E: fmt::Display,
        F: FnOnce(&mut RunnerContext) -> Result<T, E>,
    {
        let sink =
            BufferedOutput::with_settings(self.output.verbosity(), self.output.is_decorated());
        let mut flush = FlushGuard {
            output: &self.output,
            context: RunnerContext::with_output(sink),
        };

        let error_output = self.output.error_output();
        let status: &dyn Output = match &error_output {
            Some(channel) => &**channel,
            None => &self.output,
        };

        let progress = self.decorator.progress(message);
        report(status.write(&progress.text, progress.newline, verbosity));
        debug!(task = message, %verbosity, "running task");

        let invocation = panic::catch_unwind(AssertUnwindSafe(|| task(&mut flush.context)));
        let context = &flush.context;

        let closing = match &invocation {
            Ok(Ok(value)) => {
                let result = TaskResult::from_context(context);
                match context.status_message() {
                    Some(status_message) => status_message.to_string(),
                    None if result.is_success() => self.decorator.done(Some(value as &dyn Any)),
                    None => self.decorator.failed(None),
                }
            }
            Ok(Err(error)) => self.decorator.failed(Some(error as &dyn fmt::Display)),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                self.decorator.failed(Some(&message as &dyn fmt::Display))
            }
        };
        report(status.writeln(&closing, verbosity));

        let throw_errors = context.throw_errors;
        match invocation {
            Ok(Ok(value)) => {
                let result = TaskResult::from_context(context);
                debug!(task = message, %result, "task finished");
                Ok(Finished::Returned(value, result))
            }
            Ok(Err(error)) if throw_errors => {
                debug!(task = message, error = %error, "task failed");
                Err(error)
            }
            Ok(Err(error)) => {
                debug!(task = message, error = %error, "suppressing task error");
                Ok(Finished::Suppressed)
            }
            Err(payload) if throw_errors => {
                drop(flush);
                panic::resume_unwind(payload)
            }
            Err(payload) => {
                let panic = panic_message(payload.as_ref());
                debug!(task = message, %panic, "suppressing task panic");
                Ok(Finished::Suppressed)
            }
        }
    }
}

/// Writes the captured task output to the destination when dropped, so it
/// is flushed on every exit path.
struct FlushGuard<'a, O: Output> {
    output: &'a O,
    context: RunnerContext,
}

impl<O: Output> Drop for FlushGuard<'_, O> {
    fn drop(&mut self) {
        let captured = self.context.output().fetch();
        if captured.is_empty() {
            return;
        }
        report(self.output.write_raw(&captured, false));
    }
}

fn report(result: std::io::Result<()>) {
    if let Err(e) = result {
        warn!(error = %e, "Failed to write task output");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{BufferIo, IoOutput, IoVerbosity};
    use crate::Progress;
    use std::fmt::Write as _;
    use std::io;
    use std::sync::Arc;

    fn runner() -> TaskRunner<BufferedOutput> {
        TaskRunner::new(BufferedOutput::new())
    }

    fn transcript<D: ProgressDecorator>(runner: &TaskRunner<BufferedOutput, D>) -> String {
        runner.output().fetch().trim().to_string()
    }

    #[derive(Debug)]
    struct TaskError(&'static str);

    impl fmt::Display for TaskError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    #[test]
    fn test_returns_task_value() {
        let runner = runner();

        let actual = runner
            .run("Let's go", |_| Ok::<_, TaskError>("Hello World!"), Verbosity::Normal)
            .unwrap();

        assert_eq!(actual, Outcome::Value("Hello World!"));
        assert_eq!(transcript(&runner), "Let's go... Done");
    }

    #[test]
    fn test_value_returned_even_when_marked_failed() {
        let runner = runner();

        let actual = runner
            .run_normal("Let's go", |context| {
                context.mark_as_failed();
                Ok::<_, TaskError>(7)
            })
            .unwrap();

        assert_eq!(actual.into_value(), Some(7));
        assert_eq!(transcript(&runner), "Let's go... Failed");
    }

    #[test]
    fn test_effect_returns_task_result() {
        let cases = [
            (None, TaskResult::Success),
            (Some(false), TaskResult::Failure),
            (Some(true), TaskResult::Success),
        ];

        for (successful, expected) in cases {
            let runner = runner();
            let actual = runner
                .run_effect_normal("Let's go", |context| {
                    context.successful = successful;
                    Ok::<_, TaskError>(())
                })
                .unwrap();

            assert_eq!(actual, expected, "successful = {successful:?}");
        }
    }

    #[test]
    fn test_error_is_returned_unchanged() {
        let runner = runner();
        let source = Arc::new(io::Error::other("Something went wrong"));
        let raised = Arc::clone(&source);

        let actual = runner.run_normal("Let's go", move |_| Err::<(), _>(raised));

        let error = actual.unwrap_err();
        assert!(Arc::ptr_eq(&error, &source));
        assert_eq!(transcript(&runner), "Let's go... Failed");
    }

    #[test]
    fn test_suppressed_error_yields_failure() {
        let runner = runner();

        let actual = runner.run_effect_normal("Let's go", |context| {
            context.throw_errors = false;
            Err(TaskError("Something went wrong"))
        });

        assert_eq!(actual.unwrap(), TaskResult::Failure);
        assert_eq!(transcript(&runner), "Let's go... Failed");
    }

    #[test]
    fn test_suppressed_error_in_value_task() {
        let runner = runner();

        let actual = runner.run_normal("Let's go", |context| {
            context.suppress_errors();
            Err::<u32, _>(TaskError("nope"))
        });

        assert!(actual.unwrap().is_suppressed());
        assert_eq!(transcript(&runner), "Let's go... Failed");
    }

    #[test]
    fn test_custom_status_message() {
        let runner = runner();

        runner
            .run_effect_normal("Let's go", |context| {
                context.status_message = Some("Skipped".to_string());
                Ok::<_, TaskError>(())
            })
            .unwrap();

        assert_eq!(transcript(&runner), "Let's go... Skipped");
    }

    #[test]
    fn test_custom_status_message_overrides_failure() {
        let runner = runner();

        let result = runner
            .run_effect_normal("Let's go", |context| {
                context.mark_as_failed();
                context.set_status_message("Skipped");
                Ok::<_, TaskError>(())
            })
            .unwrap();

        assert_eq!(result, TaskResult::Failure);
        assert_eq!(transcript(&runner), "Let's go... Skipped");
    }

    #[test]
    fn test_task_output_follows_closing_line() {
        let runner = runner();

        runner
            .run_effect_normal("Let's go", |context| {
                writeln!(context.output(), "Hello World!").map_err(|_| TaskError("write"))
            })
            .unwrap();

        assert_eq!(transcript(&runner), "Let's go... Done\nHello World!");
    }

    #[test]
    fn test_task_output_flushed_on_error() {
        let runner = runner();

        let actual = runner.run_effect_normal("Let's go", |context| {
            context.output().writeln("partial", Verbosity::Normal).unwrap();
            Err(TaskError("boom"))
        });

        assert!(actual.is_err());
        assert_eq!(transcript(&runner), "Let's go... Failed\npartial");
    }

    #[test]
    fn test_marked_failed_shows_failed() {
        let runner = runner();

        runner
            .run_effect_normal("Let's go", |context| {
                context.successful = Some(false);
                Ok::<_, TaskError>(())
            })
            .unwrap();

        assert_eq!(transcript(&runner), "Let's go... Failed");
    }

    #[test]
    fn test_nothing_written_above_threshold() {
        let runner = runner();

        runner
            .run("Let's go", |_| Ok::<_, TaskError>("Hello World!"), Verbosity::Verbose)
            .unwrap();

        assert_eq!(runner.output().fetch(), "");
    }

    #[test]
    fn test_nothing_written_above_threshold_on_failure() {
        let runner = runner();

        let _ = runner.run_effect("Let's go", |_| Err(TaskError("boom")), Verbosity::Debug);

        assert_eq!(runner.output().fetch(), "");
    }

    #[test]
    fn test_task_output_bypasses_runner_verbosity() {
        let runner = runner();

        runner
            .run_effect(
                "Let's go",
                |context| {
                    context.output().writeln("from task", Verbosity::Normal).unwrap();
                    Ok::<_, TaskError>(())
                },
                Verbosity::Verbose,
            )
            .unwrap();

        assert_eq!(runner.output().fetch(), "from task\n");
    }

    #[test]
    fn test_task_output_forwarded_on_quiet_destination() {
        let runner = TaskRunner::new(BufferedOutput::with_settings(Verbosity::Quiet, false));

        runner
            .run_effect_normal("Let's go", |context| {
                writeln!(context.output(), "Hello World!").map_err(|_| TaskError("write"))
            })
            .unwrap();

        assert_eq!(runner.output().fetch(), "Hello World!\n");
    }

    #[test]
    fn test_task_output_uses_destination_verbosity() {
        let runner = TaskRunner::new(BufferedOutput::with_settings(Verbosity::Verbose, false));

        runner
            .run_effect_normal("Let's go", |context| {
                context.output().writeln("verbose", Verbosity::Verbose).unwrap();
                context.output().writeln("debug", Verbosity::Debug).unwrap();
                Ok::<_, TaskError>(())
            })
            .unwrap();

        assert_eq!(transcript(&runner), "Let's go... Done\nverbose");
    }

    #[test]
    fn test_panic_is_resumed_after_flush() {
        let runner = runner();

        let caught = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = runner.run_effect_normal("Let's go", |context| {
                context.output().writeln("before panic", Verbosity::Normal).unwrap();
                if context.throw_errors {
                    panic!("task exploded");
                }
                Ok::<_, TaskError>(())
            });
        }));

        let payload = caught.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"task exploded"));
        assert_eq!(transcript(&runner), "Let's go... Failed\nbefore panic");
    }

    #[test]
    fn test_suppressed_panic_yields_failure() {
        let runner = runner();

        let actual = runner.run_effect_normal("Let's go", |context| {
            context.suppress_errors();
            if !context.throw_errors {
                panic!("task exploded");
            }
            Ok::<_, TaskError>(())
        });

        assert_eq!(actual.unwrap(), TaskResult::Failure);
        assert_eq!(transcript(&runner), "Let's go... Failed");
    }

    #[test]
    fn test_runner_is_reusable() {
        let runner = runner();

        runner.run_effect_normal("First", |_| Ok::<_, TaskError>(())).unwrap();
        runner
            .run_effect_normal("Second", |context| {
                context.mark_as_failed();
                Ok::<_, TaskError>(())
            })
            .unwrap();

        assert_eq!(transcript(&runner), "First... Done\nSecond... Failed");
    }

    #[test]
    fn test_build_io_output() {
        let runner = TaskRunner::new(IoOutput::new(BufferIo::default()));

        runner.run_normal("Let's go", |_| Ok::<_, TaskError>("Hello World!")).unwrap();

        assert_eq!(runner.output().io().output().trim(), "Let's go... Done");
    }

    #[test]
    fn test_build_io_maps_verbosity() {
        let levels = [
            Verbosity::Debug,
            Verbosity::VeryVerbose,
            Verbosity::Verbose,
            Verbosity::Normal,
            Verbosity::Quiet,
        ];

        for level in levels {
            let runner = TaskRunner::new(IoOutput::new(BufferIo::new(IoVerbosity::from(level))));

            runner.run("Let's go", |_| Ok::<_, TaskError>("Hello World!"), level).unwrap();

            assert_eq!(runner.output().io().output().trim(), "Let's go... Done", "level {level}");
        }
    }

    /// Two-channel destination recording which channel received what.
    #[derive(Default)]
    struct SplitOutput {
        main: BufferedOutput,
        errors: BufferedOutput,
    }

    impl Output for SplitOutput {
        fn write_raw(&self, text: &str, newline: bool) -> io::Result<()> {
            self.main.write_raw(text, newline)
        }

        fn verbosity(&self) -> Verbosity {
            self.main.verbosity()
        }

        fn is_decorated(&self) -> bool {
            false
        }

        fn error_output(&self) -> Option<Box<dyn Output + '_>> {
            Some(Box::new(&self.errors))
        }
    }

    #[test]
    fn test_prefers_error_channel_for_status_lines() {
        let runner = TaskRunner::new(SplitOutput::default());

        runner
            .run_effect_normal("Let's go", |context| {
                writeln!(context.output(), "payload").map_err(|_| TaskError("write"))
            })
            .unwrap();

        assert_eq!(runner.output().errors.fetch(), "Let's go... Done\n");
        assert_eq!(runner.output().main.fetch(), "payload\n");
    }

    struct VerboseDecorator;

    impl ProgressDecorator for VerboseDecorator {
        fn progress(&self, message: &str) -> Progress {
            Progress::line(format!("> {message}"))
        }

        fn done(&self, value: Option<&dyn Any>) -> String {
            match value.and_then(|v| v.downcast_ref::<u32>()) {
                Some(count) => format!("done ({count} items)"),
                None => "done".to_string(),
            }
        }

        fn failed(&self, failure: Option<&dyn fmt::Display>) -> String {
            match failure {
                Some(failure) => format!("failed: {failure}"),
                None => "failed".to_string(),
            }
        }
    }

    #[test]
    fn test_custom_decorator() {
        let runner = TaskRunner::with_decorator(BufferedOutput::new(), VerboseDecorator);

        runner.run_normal("Counting", |_| Ok::<_, TaskError>(3_u32)).unwrap();
        let _ = runner.run_effect_normal("Breaking", |_| Err(TaskError("disk full")));
        runner.run_effect_normal("Nothing", |_| Ok::<_, TaskError>(())).unwrap();

        assert_eq!(
            transcript(&runner),
            "> Counting\ndone (3 items)\n> Breaking\nfailed: disk full\n> Nothing\ndone"
        );
    }

    #[test]
    fn test_custom_decorator_reports_panic_message() {
        let runner = TaskRunner::with_decorator(BufferedOutput::new(), VerboseDecorator);

        let actual = runner.run_effect_normal("Crashing", |context| {
            context.suppress_errors();
            if !context.throw_errors {
                panic!("index out of range");
            }
            Ok::<_, TaskError>(())
        });

        assert_eq!(actual.unwrap(), TaskResult::Failure);
        assert_eq!(transcript(&runner), "> Crashing\nfailed: index out of range");
    }
}
