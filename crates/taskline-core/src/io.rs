//! Build-tool style IO.
//!
//! Build tools usually expose an IO object with separate regular and error
//! channels and their own verbosity numbering. [`IoOutput`] adapts any
//! [`BuildIo`] to the [`Output`] contract the runner depends on.

use crate::markup;
use crate::output::Output;
use crate::Verbosity;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Verbosity as numbered by build-tool IO.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum IoVerbosity {
    Quiet = 1,
    #[default]
    Normal = 2,
    Verbose = 4,
    VeryVerbose = 8,
    Debug = 16,
}

impl IoVerbosity {
    /// Numeric flag value.
    pub fn as_flag(self) -> u8 {
        self as u8
    }
}

impl From<Verbosity> for IoVerbosity {
    fn from(verbosity: Verbosity) -> Self {
        match verbosity {
            Verbosity::Quiet => Self::Quiet,
            Verbosity::Normal => Self::Normal,
            Verbosity::Verbose => Self::Verbose,
            Verbosity::VeryVerbose => Self::VeryVerbose,
            Verbosity::Debug => Self::Debug,
        }
    }
}

impl From<IoVerbosity> for Verbosity {
    fn from(verbosity: IoVerbosity) -> Self {
        match verbosity {
            IoVerbosity::Quiet => Self::Quiet,
            IoVerbosity::Normal => Self::Normal,
            IoVerbosity::Verbose => Self::Verbose,
            IoVerbosity::VeryVerbose => Self::VeryVerbose,
            IoVerbosity::Debug => Self::Debug,
        }
    }
}

/// IO object of a build tool.
///
/// Implementations gate `write`/`write_error` by their own verbosity and
/// render style tags themselves. The raw variants bypass both.
pub trait BuildIo {
    fn write(&self, text: &str, newline: bool, verbosity: IoVerbosity) -> io::Result<()>;

    fn write_error(&self, text: &str, newline: bool, verbosity: IoVerbosity) -> io::Result<()>;

    fn write_raw(&self, text: &str, newline: bool) -> io::Result<()>;

    fn write_error_raw(&self, text: &str, newline: bool) -> io::Result<()>;

    fn verbosity(&self) -> IoVerbosity;

    fn is_decorated(&self) -> bool;
}

/// Adapter exposing a [`BuildIo`] as an [`Output`].
///
/// The IO's error channel becomes the adapter's
/// [`error_output`](Output::error_output).
#[derive(Debug)]
pub struct IoOutput<I> {
    io: I,
}

impl<I: BuildIo> IoOutput<I> {
    /// Wrap `io`.
    pub fn new(io: I) -> Self {
        Self { io }
    }

    /// The wrapped IO.
    pub fn io(&self) -> &I {
        &self.io
    }

    /// Unwrap the IO.
    pub fn into_inner(self) -> I {
        self.io
    }
}

impl<I: BuildIo> Output for IoOutput<I> {
    fn write_raw(&self, text: &str, newline: bool) -> io::Result<()> {
        self.io.write_raw(text, newline)
    }

    fn verbosity(&self) -> Verbosity {
        self.io.verbosity().into()
    }

    fn is_decorated(&self) -> bool {
        self.io.is_decorated()
    }

    fn write(&self, text: &str, newline: bool, verbosity: Verbosity) -> io::Result<()> {
        self.io.write(text, newline, verbosity.into())
    }

    fn error_output(&self) -> Option<Box<dyn Output + '_>> {
        Some(Box::new(ErrorChannel(&self.io)))
    }
}

/// Error channel of a [`BuildIo`].
struct ErrorChannel<'a, I>(&'a I);

impl<I: BuildIo> Output for ErrorChannel<'_, I> {
    fn write_raw(&self, text: &str, newline: bool) -> io::Result<()> {
        self.0.write_error_raw(text, newline)
    }

    fn verbosity(&self) -> Verbosity {
        self.0.verbosity().into()
    }

    fn is_decorated(&self) -> bool {
        self.0.is_decorated()
    }

    fn write(&self, text: &str, newline: bool, verbosity: Verbosity) -> io::Result<()> {
        self.0.write_error(text, newline, verbosity.into())
    }
}

/// In-memory [`BuildIo`]. Both channels share one buffer.
#[derive(Debug, Default)]
pub struct BufferIo {
    buffer: Mutex<String>,
    verbosity: IoVerbosity,
    decorated: bool,
}

impl BufferIo {
    /// Undecorated buffer with the given threshold.
    pub fn new(verbosity: IoVerbosity) -> Self {
        Self {
            buffer: Mutex::new(String::new()),
            verbosity,
            decorated: false,
        }
    }

    /// Builder method to enable style rendering.
    pub fn decorated(mut self, decorated: bool) -> Self {
        self.decorated = decorated;
        self
    }

    /// Everything written to either channel so far.
    pub fn output(&self) -> String {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn append(&self, text: &str, newline: bool) {
        let mut buffer = self.lock();
        buffer.push_str(text);
        if newline {
            buffer.push('\n');
        }
    }
}

impl BuildIo for BufferIo {
    fn write(&self, text: &str, newline: bool, verbosity: IoVerbosity) -> io::Result<()> {
        if verbosity <= self.verbosity {
            self.append(&markup::render(text, self.decorated), newline);
        }
        Ok(())
    }

    fn write_error(&self, text: &str, newline: bool, verbosity: IoVerbosity) -> io::Result<()> {
        self.write(text, newline, verbosity)
    }

    fn write_raw(&self, text: &str, newline: bool) -> io::Result<()> {
        self.append(text, newline);
        Ok(())
    }

    fn write_error_raw(&self, text: &str, newline: bool) -> io::Result<()> {
        self.write_raw(text, newline)
    }

    fn verbosity(&self) -> IoVerbosity {
        self.verbosity
    }

    fn is_decorated(&self) -> bool {
        self.decorated
    }
}
