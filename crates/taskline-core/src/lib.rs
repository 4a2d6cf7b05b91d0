//! Taskline Core
//!
//! Runs units of work with consistent progress reporting:
//! print a message, run the task, print `Done`/`Failed` or a custom status,
//! then forward whatever the task wrote.
//!
//! The runner depends only on the [`Output`] trait. Console, in-memory and
//! build-tool destinations are provided.

pub mod context;
pub mod decorator;
pub mod error;
pub mod io;
pub mod markup;
pub mod output;
pub mod result;
pub mod runner;
pub mod verbosity;

// Re-export commonly used types
pub use context::RunnerContext;
pub use decorator::{Progress, ProgressDecorator, SimpleProgressDecorator};
pub use error::CoreError;
pub use io::{BufferIo, BuildIo, IoOutput, IoVerbosity};
pub use output::{BufferedOutput, ConsoleOutput, Output, Stream, StreamOutput};
pub use result::TaskResult;
pub use runner::{Outcome, TaskRunner};
pub use verbosity::Verbosity;
