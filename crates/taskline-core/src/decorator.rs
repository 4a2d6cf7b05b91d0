//! Formatting of progress and closing lines.

use std::any::Any;
use std::fmt;

/// Rendered progress line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Text written before the task starts.
    pub text: String,
    /// End the progress write with a line break. When false, the closing
    /// status lands on the same line.
    pub newline: bool,
}

impl Progress {
    /// Progress text followed by the closing status on the same line.
    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            newline: false,
        }
    }

    /// Progress text on a line of its own.
    pub fn line(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            newline: true,
        }
    }
}

/// Formats the lines a [`TaskRunner`](crate::TaskRunner) writes around a task.
///
/// Returned strings may contain style tags (see [`markup`](crate::markup)).
pub trait ProgressDecorator {
    /// Line written before the task runs.
    fn progress(&self, message: &str) -> Progress;

    /// Closing line for a successful task. `value` is the task's return
    /// value, or `None` for tasks without one.
    fn done(&self, value: Option<&dyn Any>) -> String;

    /// Closing line for a failed task. `failure` is the error the task
    /// raised, or `None` if it only marked itself as failed.
    fn failed(&self, failure: Option<&dyn fmt::Display>) -> String;
}

/// Default decorator: `"<message>... Done"` / `"<message>... Failed"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleProgressDecorator;

impl ProgressDecorator for SimpleProgressDecorator {
    fn progress(&self, message: &str) -> Progress {
        Progress::inline(format!("{message}... "))
    }

    fn done(&self, _value: Option<&dyn Any>) -> String {
        "<info>Done</info>".to_string()
    }

    fn failed(&self, _failure: Option<&dyn fmt::Display>) -> String {
        "<error>Failed</error>".to_string()
    }
}
