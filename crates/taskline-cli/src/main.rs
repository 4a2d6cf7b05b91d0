//! Taskline CLI - run commands with progress reporting.

use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use taskline_core::{ConsoleOutput, TaskRunner, Verbosity};

mod commands;
mod config;
mod executor;

use commands::RunOptions;
use config::OutputConfig;
use executor::CommandTask;

/// Taskline - progress reporting for commands
#[derive(Parser)]
#[command(name = "taskline")]
#[command(about = "Run commands with progress reporting", long_about = None)]
struct Cli {
    /// Only show essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Force colored output
    #[arg(long, global = true, conflicts_with = "no_ansi")]
    ansi: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_ansi: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command as a task
    Run {
        /// Progress message (defaults to the command line)
        #[arg(short, long)]
        message: Option<String>,

        /// Verbosity at which progress lines are shown
        #[arg(long, default_value = "normal")]
        level: Verbosity,

        /// Report spawn errors as a failure instead of aborting
        #[arg(long)]
        keep_going: bool,

        /// Closing text shown instead of "Done" on success
        #[arg(long, value_name = "TEXT")]
        status_on_success: Option<String>,

        /// Command and arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Logs go to stderr, away from the progress transcript
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = OutputConfig::from_flags(cli.quiet, cli.verbose, cli.ansi, cli.no_ansi);
    let runner = TaskRunner::new(ConsoleOutput::new(config.verbosity, config.decorated));

    match cli.command {
        Commands::Run {
            message,
            level,
            keep_going,
            status_on_success,
            command,
        } => {
            let task = CommandTask::from_argv(command)?;
            let options = RunOptions {
                message,
                level,
                keep_going,
                status_on_success,
            };

            match commands::run_command(&runner, &task, &options) {
                Ok(result) => Ok(ExitCode::from(commands::exit_code(result))),
                Err(e) => {
                    error!(error = %e, "Task aborted");
                    Err(e.into())
                }
            }
        }
    }
}
