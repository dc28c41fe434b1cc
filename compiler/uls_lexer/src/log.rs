//! Injected diagnostics sink.
//!
//! Each [`Lexer`](crate::Lexer) holds an `Arc<dyn LogSink>`. Diagnostics that
//! are not errors of the token stream itself (an unget called twice, a
//! failed refill) are reported through it with the source tag and line.
//! [`LexSpecBuilder::sink`](crate::LexSpecBuilder::sink) takes one for
//! build diagnostics such as an overwritten one-char slot; those carry the
//! specification name and line 0. [`TracingSink`] forwards to `tracing`;
//! [`MemorySink`] keeps formatted records and may be shared by lexers on
//! several threads.

use std::fmt;

use parking_lot::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

/// One diagnostic.
#[derive(Clone, Copy, Debug)]
pub struct LogRecord<'a> {
    pub level: LogLevel,
    pub tag: &'a str,
    pub line: usize,
    pub message: fmt::Arguments<'a>,
}

impl fmt::Display for LogRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}] {}", self.tag, self.line, self.message)
    }
}

pub trait LogSink: fmt::Debug + Send + Sync {
    fn log(&self, record: &LogRecord<'_>);
}

/// Forwards records to `tracing` under the `uls` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, record: &LogRecord<'_>) {
        let (tag, line, message) = (record.tag, record.line, record.message);
        match record.level {
            LogLevel::Error => tracing::error!(target: "uls", tag, line, "{message}"),
            LogLevel::Warn => tracing::warn!(target: "uls", tag, line, "{message}"),
            LogLevel::Info => tracing::info!(target: "uls", tag, line, "{message}"),
            LogLevel::Debug => tracing::debug!(target: "uls", tag, line, "{message}"),
        }
    }
}

/// Collects formatted records at or above a level.
#[derive(Debug)]
pub struct MemorySink {
    max_level: LogLevel,
    records: Mutex<Vec<String>>,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

impl MemorySink {
    pub fn new(max_level: LogLevel) -> Self {
        Self {
            max_level,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Copy of the records collected so far.
    pub fn records(&self) -> Vec<String> {
        self.records.lock().clone()
    }

    /// Remove and return the records collected so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.records.lock())
    }
}

impl LogSink for MemorySink {
    fn log(&self, record: &LogRecord<'_>) {
        if record.level <= self.max_level {
            self.records.lock().push(record.to_string());
        }
    }
}
