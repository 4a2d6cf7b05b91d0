//! External command execution as a Taskline task.

use std::io;
use std::process::{Command, Stdio};

use taskline_core::{Output, RunnerContext};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("No command given")]
    EmptyCommand,

    #[error("Failed to spawn '{program}': {source}")]
    SpawnError {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to capture command output: {0}")]
    OutputError(#[from] io::Error),
}

/// A command line to run inside a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTask {
    program: String,
    args: Vec<String>,
}

impl CommandTask {
    /// Build from an argv-style list; the first entry is the program.
    pub fn from_argv(argv: Vec<String>) -> Result<Self, ExecutorError> {
        let mut argv = argv.into_iter();
        let program = argv.next().ok_or(ExecutorError::EmptyCommand)?;
        Ok(Self {
            program,
            args: argv.collect(),
        })
    }

    /// The command line as typed, for progress messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the command, capturing stdout and stderr into the task output.
    ///
    /// The exit status decides the verdict; a failing status also replaces
    /// the closing line with the exit code. Returns the exit code, if the
    /// process was not killed by a signal.
    pub fn execute(&self, context: &mut RunnerContext) -> Result<Option<i32>, ExecutorError> {
        info!(program = %self.program, args = ?self.args, "Spawning command");

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExecutorError::SpawnError {
                program: self.program.clone(),
                source,
            })?;

        let code = output.status.code();
        debug!(
            code = ?code,
            stdout_len = output.stdout.len(),
            stderr_len = output.stderr.len(),
            "Command exited"
        );

        let sink = context.output();
        sink.write_raw(&String::from_utf8_lossy(&output.stdout), false)?;
        sink.write_raw(&String::from_utf8_lossy(&output.stderr), false)?;

        if output.status.success() {
            context.mark_as_successful();
        } else {
            context.mark_as_failed();
            if let Some(code) = code {
                context.set_status_message(format!("<error>Failed (exit code {code})</error>"));
            }
        }

        Ok(code)
    }
}
