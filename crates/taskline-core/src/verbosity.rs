//! Verbosity levels for output destinations.

use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Verbosity of a destination, or of a single line written to it.
///
/// A line is emitted only if its verbosity does not exceed the verbosity the
/// destination is configured with.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Verbosity {
    /// Only essential output.
    Quiet,
    /// Regular output.
    #[default]
    Normal,
    /// Additional informational output (`-v`).
    Verbose,
    /// Even more detail (`-vv`).
    VeryVerbose,
    /// Debug output (`-vvv`).
    Debug,
}

impl Verbosity {
    /// Map command-line style flags to a verbosity.
    ///
    /// `quiet` wins over any number of `-v` flags.
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::VeryVerbose,
            _ => Self::Debug,
        }
    }

    /// Returns true if a line written at `level` passes this threshold.
    pub fn allows(&self, level: Verbosity) -> bool {
        level <= *self
    }

    /// Canonical name of this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Normal => "normal",
            Self::Verbose => "verbose",
            Self::VeryVerbose => "very-verbose",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verbosity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            "very-verbose" | "very_verbose" => Ok(Self::VeryVerbose),
            "debug" => Ok(Self::Debug),
            _ => Err(CoreError::InvalidVerbosity(s.to_string())),
        }
    }
}
