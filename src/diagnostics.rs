//! Diagnostic output
//!
//! Single-line, timestamp-prefixed messages for the host's error stream.
//! Stdout is left alone: host runtimes may use it for control messages.

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;

/// Destination for diagnostic lines
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, message: &str);
}

/// Format a diagnostic line: `<RFC 3339 timestamp> - <message>`
///
/// Newlines in the message are flattened to spaces so each diagnostic stays
/// on one line.
pub fn format_line(now: DateTime<Utc>, message: &str) -> String {
    let flat: String = message
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    format!("{} - {}", now.to_rfc3339_opts(SecondsFormat::Secs, true), flat)
}

/// Writes diagnostics to the process's stderr
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn emit(&self, message: &str) {
        eprintln!("{}", format_line(Utc::now(), message));
    }
}

/// Collects diagnostics in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line emitted so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, message: &str) {
        self.lines.lock().push(format_line(Utc::now(), message));
    }
}
