//! Activity logging capability injected into the organizer.
//!
//! The engine only needs to emit human-readable `info` and `error` lines; where
//! those lines end up is decided by whoever constructs it.

use std::sync::Mutex;

/// Sink for the organizer's human-readable activity lines.
pub trait ActivityLog: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards activity lines to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl ActivityLog for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!(target: "screenshot_organizer", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "screenshot_organizer", "{message}");
    }
}

/// Severity of a captured line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// Keeps every line in memory. Used by tests and by callers that want to
/// replay what a pass did.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all captured lines.
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Returns the captured messages at `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}

impl ActivityLog for MemoryLog {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}
