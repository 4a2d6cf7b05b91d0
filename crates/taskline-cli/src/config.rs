//! Output configuration.

use taskline_core::Verbosity;

/// Output configuration, built from global command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Verbosity threshold of the console.
    pub verbosity: Verbosity,

    /// Force ANSI colors on or off. `None` detects a terminal.
    pub decorated: Option<bool>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Normal,
            decorated: None,
        }
    }
}

impl OutputConfig {
    /// Build from `-q`, `-v...`, `--ansi` and `--no-ansi`.
    pub fn from_flags(quiet: bool, verbose: u8, ansi: bool, no_ansi: bool) -> Self {
        let decorated = match (ansi, no_ansi) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        Self {
            verbosity: Verbosity::from_flags(quiet, verbose),
            decorated,
        }
    }
}
