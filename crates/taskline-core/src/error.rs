//! Core errors.

use thiserror::Error;

/// Errors raised while configuring Taskline outputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Unknown verbosity name.
    #[error("Invalid verbosity '{0}': expected quiet, normal, verbose, very-verbose or debug")]
    InvalidVerbosity(String),
}
