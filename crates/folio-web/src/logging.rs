#![forbid(unsafe_code)]

//! `tracing` output routed to the browser console.
//!
//! The fmt layer formats each event into a fresh [`ConsoleWriter`]; the
//! writer hands the finished line to a sink when it is dropped. On wasm the
//! sink is `console.log` / `console.warn` / `console.error` chosen by level;
//! natively any `fn(ConsoleLevel, &str)` works, which keeps this testable.

use std::io;

use tracing_subscriber::EnvFilter;

/// Console method a line is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Log,
    Warn,
    Error,
}

impl ConsoleLevel {
    /// Classify a formatted fmt-layer line by its level prefix.
    #[must_use]
    pub fn of_line(line: &str) -> Self {
        let line = line.trim_start();
        if line.starts_with("ERROR") {
            Self::Error
        } else if line.starts_with("WARN") {
            Self::Warn
        } else {
            Self::Log
        }
    }
}

pub type ConsoleSink = fn(ConsoleLevel, &str);

/// Buffers one formatted event and emits it on drop.
pub struct ConsoleWriter {
    buf: Vec<u8>,
    sink: ConsoleSink,
}

impl ConsoleWriter {
    #[must_use]
    pub fn new(sink: ConsoleSink) -> Self {
        Self {
            buf: Vec::with_capacity(128),
            sink,
        }
    }

    fn emit(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buf);
        let line = text.trim_end_matches(['\n', '\r']);
        if !line.is_empty() {
            (self.sink)(ConsoleLevel::of_line(line), line);
        }
        self.buf.clear();
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit();
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        self.emit();
    }
}

/// Filter for `directive`, falling back to `info` when it does not parse.
#[must_use]
pub fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(directive: &str, sink: ConsoleSink) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(directive))
        .without_time()
        .with_ansi(false)
        .with_writer(move || ConsoleWriter::new(sink))
        .try_init();
}
