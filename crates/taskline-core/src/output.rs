//! Output destinations.
//!
//! The runner only depends on the [`Output`] trait. This module provides an
//! in-memory buffer used for task output capture and tests, and console
//! destinations writing to the standard streams.

use crate::markup;
use crate::Verbosity;
use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A destination for progress and task output.
pub trait Output {
    /// Write `text` without verbosity gating or style rendering.
    fn write_raw(&self, text: &str, newline: bool) -> io::Result<()>;

    /// Verbosity threshold of this destination.
    fn verbosity(&self) -> Verbosity;

    /// Whether style tags are rendered as ANSI colors.
    fn is_decorated(&self) -> bool;

    /// Write `text` if `verbosity` passes this destination's threshold.
    ///
    /// Style tags are rendered according to [`is_decorated`](Self::is_decorated).
    fn write(&self, text: &str, newline: bool, verbosity: Verbosity) -> io::Result<()> {
        if !self.verbosity().allows(verbosity) {
            return Ok(());
        }
        self.write_raw(&markup::render(text, self.is_decorated()), newline)
    }

    fn writeln(&self, text: &str, verbosity: Verbosity) -> io::Result<()> {
        self.write(text, true, verbosity)
    }

    /// Separate channel for diagnostics, if this destination has one.
    fn error_output(&self) -> Option<Box<dyn Output + '_>> {
        None
    }
}

impl<T: Output + ?Sized> Output for &T {
    fn write_raw(&self, text: &str, newline: bool) -> io::Result<()> {
        (**self).write_raw(text, newline)
    }

    fn verbosity(&self) -> Verbosity {
        (**self).verbosity()
    }

    fn is_decorated(&self) -> bool {
        (**self).is_decorated()
    }

    fn write(&self, text: &str, newline: bool, verbosity: Verbosity) -> io::Result<()> {
        (**self).write(text, newline, verbosity)
    }

    fn error_output(&self) -> Option<Box<dyn Output + '_>> {
        (**self).error_output()
    }
}

/// In-memory destination.
///
/// Everything written is kept until [`fetch`](Self::fetch) drains it.
#[derive(Debug, Default)]
pub struct BufferedOutput {
    buffer: Mutex<String>,
    verbosity: Verbosity,
    decorated: bool,
}

impl BufferedOutput {
    /// Undecorated buffer at [`Verbosity::Normal`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer with the given threshold and decoration.
    pub fn with_settings(verbosity: Verbosity, decorated: bool) -> Self {
        Self {
            buffer: Mutex::new(String::new()),
            verbosity,
            decorated,
        }
    }

    /// Return everything written so far and clear the buffer.
    pub fn fetch(&self) -> String {
        std::mem::take(&mut *self.lock())
    }

    /// Returns true if nothing was written since the last fetch.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Output for BufferedOutput {
    fn write_raw(&self, text: &str, newline: bool) -> io::Result<()> {
        let mut buffer = self.lock();
        buffer.push_str(text);
        if newline {
            buffer.push('\n');
        }
        Ok(())
    }

    fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    fn is_decorated(&self) -> bool {
        self.decorated
    }
}

/// `write!` support. Writes are kept verbatim, without verbosity gating.
impl fmt::Write for BufferedOutput {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_raw(s, false).map_err(|_| fmt::Error)
    }
}

/// Standard stream selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn is_terminal(self) -> bool {
        match self {
            Self::Stdout => io::stdout().is_terminal(),
            Self::Stderr => io::stderr().is_terminal(),
        }
    }
}

/// Destination writing to stdout or stderr.
#[derive(Debug, Clone)]
pub struct StreamOutput {
    stream: Stream,
    verbosity: Verbosity,
    decorated: bool,
}

impl StreamOutput {
    /// Create a stream destination.
    ///
    /// Decoration is enabled when the stream is a terminal unless `decorated`
    /// forces it either way.
    pub fn new(stream: Stream, verbosity: Verbosity, decorated: Option<bool>) -> Self {
        Self {
            stream,
            verbosity,
            decorated: decorated.unwrap_or_else(|| stream.is_terminal()),
        }
    }

    /// The stream this destination writes to.
    pub fn stream(&self) -> Stream {
        self.stream
    }
}

impl Output for StreamOutput {
    fn write_raw(&self, text: &str, newline: bool) -> io::Result<()> {
        match self.stream {
            Stream::Stdout => emit(io::stdout().lock(), text, newline),
            Stream::Stderr => emit(io::stderr().lock(), text, newline),
        }
    }

    fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    fn is_decorated(&self) -> bool {
        self.decorated
    }
}

fn emit<W: Write>(mut writer: W, text: &str, newline: bool) -> io::Result<()> {
    writer.write_all(text.as_bytes())?;
    if newline {
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Console destination: stdout for regular output, stderr as error channel.
#[derive(Debug, Clone)]
pub struct ConsoleOutput {
    stdout: StreamOutput,
    stderr: StreamOutput,
}

impl ConsoleOutput {
    /// Console with the same settings on both streams.
    pub fn new(verbosity: Verbosity, decorated: Option<bool>) -> Self {
        Self {
            stdout: StreamOutput::new(Stream::Stdout, verbosity, decorated),
            stderr: StreamOutput::new(Stream::Stderr, verbosity, decorated),
        }
    }
}

impl Output for ConsoleOutput {
    fn write_raw(&self, text: &str, newline: bool) -> io::Result<()> {
        self.stdout.write_raw(text, newline)
    }

    fn verbosity(&self) -> Verbosity {
        self.stdout.verbosity()
    }

    fn is_decorated(&self) -> bool {
        self.stdout.is_decorated()
    }

    fn error_output(&self) -> Option<Box<dyn Output + '_>> {
        Some(Box::new(&self.stderr))
    }
}
