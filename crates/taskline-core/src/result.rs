//! Task outcome.

use crate::RunnerContext;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a task, derived from its [`RunnerContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskResult {
    /// Task completed without an explicit failure verdict.
    Success,
    /// Task marked itself as failed, or raised a suppressed error.
    Failure,
}

impl TaskResult {
    /// Derive the result from the state a task left in its context.
    ///
    /// Only an explicit `successful == Some(false)` is a failure; a task that
    /// never gave a verdict counts as successful.
    pub fn from_context(context: &RunnerContext) -> Self {
        match context.successful {
            Some(false) => Self::Failure,
            Some(true) | None => Self::Success,
        }
    }

    /// Returns true for [`TaskResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns true for [`TaskResult::Failure`].
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure)
    }
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failure => f.write_str("failure"),
        }
    }
}
