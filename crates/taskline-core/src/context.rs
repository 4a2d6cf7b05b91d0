//! Per-run state handed to a task.

use crate::output::BufferedOutput;

/// Mutable state of a single task run.
///
/// A fresh context is created for every call to
/// [`TaskRunner::run`](crate::TaskRunner::run). The task reports its verdict
/// through [`successful`](Self::successful), may override the closing status
/// line, and writes its own output into a private buffer that is flushed
/// after the closing line.
#[derive(Debug)]
pub struct RunnerContext {
    /// Explicit verdict of the task. `None` means no verdict was given.
    pub successful: Option<bool>,

    /// Replaces the decorator's done/failed text when non-empty.
    pub status_message: Option<String>,

    /// Whether a task error is returned to the caller. When false, the
    /// runner swallows the error and reports a failure instead.
    pub throw_errors: bool,

    output: BufferedOutput,
}

impl RunnerContext {
    /// Create a context with an empty output buffer.
    pub fn new() -> Self {
        Self::with_output(BufferedOutput::new())
    }

    /// Create a context writing into the given buffer.
    pub fn with_output(output: BufferedOutput) -> Self {
        Self {
            successful: None,
            status_message: None,
            throw_errors: true,
            output,
        }
    }

    /// Buffer for task output. Anything written here is shown after the
    /// closing status line.
    pub fn output(&mut self) -> &mut BufferedOutput {
        &mut self.output
    }

    /// Record an explicit success verdict.
    pub fn mark_as_successful(&mut self) {
        self.successful = Some(true);
    }

    /// Record an explicit failure verdict.
    pub fn mark_as_failed(&mut self) {
        self.successful = Some(false);
    }

    /// Replace the closing line with `message`.
    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Turn task errors into a failure result instead of returning them.
    pub fn suppress_errors(&mut self) {
        self.throw_errors = false;
    }

    /// The status override, if one is set and non-empty.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref().filter(|m| !m.is_empty())
    }

    /// Consume the context and return its output buffer.
    pub fn into_output(self) -> BufferedOutput {
        self.output
    }
}

impl Default for RunnerContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn test_defaults() {
        let context = RunnerContext::new();
        assert_eq!(context.successful, None);
        assert_eq!(context.status_message(), None);
        assert!(context.throw_errors);
    }

    #[test]
    fn test_mark_as_successful() {
        let mut context = RunnerContext::new();
        context.mark_as_successful();
        assert_eq!(context.successful, Some(true));

        context.mark_as_successful();
        assert_eq!(context.successful, Some(true));
    }

    #[test]
    fn test_mark_as_failed() {
        let mut context = RunnerContext::new();
        context.mark_as_failed();
        assert_eq!(context.successful, Some(false));
    }

    #[test]
    fn test_empty_status_message_is_ignored() {
        let mut context = RunnerContext::new();
        context.set_status_message("");
        assert_eq!(context.status_message(), None);

        context.set_status_message("Skipped");
        assert_eq!(context.status_message(), Some("Skipped"));
    }

    #[test]
    fn test_suppress_errors() {
        let mut context = RunnerContext::new();
        context.suppress_errors();
        assert!(!context.throw_errors);
    }

    #[test]
    fn test_output_is_captured() {
        let mut context = RunnerContext::new();
        writeln!(context.output(), "Hello World!").unwrap();

        assert_eq!(context.into_output().fetch(), "Hello World!\n");
    }
}
