//! The logging capability a host engine hands to each node invocation.

use std::sync::Mutex;

use tracing::{debug, error, info, warn};

/// Leveled messages from a node to its host.
pub trait WorkflowLogger: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards node messages to `tracing`, tagged with the node id.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    node_id: String,
}

impl TracingLogger {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
        }
    }
}

impl WorkflowLogger for TracingLogger {
    fn debug(&self, message: &str) {
        debug!(node_id = %self.node_id, "{message}");
    }

    fn info(&self, message: &str) {
        info!(node_id = %self.node_id, "{message}");
    }

    fn warning(&self, message: &str) {
        warn!(node_id = %self.node_id, "{message}");
    }

    fn error(&self, message: &str) {
        error!(node_id = %self.node_id, "{message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Keeps every message in memory. Useful for hosts that attach logs to
/// step results, and for tests.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }

    fn push(&self, level: LogLevel, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}

impl WorkflowLogger for RecordingLogger {
    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warning(&self, message: &str) {
        self.push(LogLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}
