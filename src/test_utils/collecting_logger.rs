//! A logger that accumulates messages in memory for test assertions.

use std::sync::Arc;

use log::Level;
use parking_lot::Mutex;

use crate::output_log::{OutputLogger, SharedLogger};

/// Logger that stores every message it receives for later inspection.
#[derive(Clone, Default)]
pub struct CollectingLogger {
    messages: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CollectingLogger {
    /// Create a new empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logger whose output nobody inspects.
    pub fn shared() -> SharedLogger {
        Arc::new(Self::new())
    }

    /// Shareable handle writing into this logger's buffer.
    pub fn handle(&self) -> SharedLogger {
        Arc::new(self.clone())
    }

    /// Return a snapshot of all messages received so far.
    pub fn collected(&self) -> Vec<(Level, String)> {
        self.messages.lock().clone()
    }

    /// Messages logged at `level`.
    pub fn at(&self, level: Level) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Whether any message contains `fragment`.
    pub fn contains(&self, fragment: &str) -> bool {
        self.messages.lock().iter().any(|(_, m)| m.contains(fragment))
    }

    fn push(&self, level: Level, message: &str) {
        self.messages.lock().push((level, message.to_owned()));
    }
}

impl OutputLogger for CollectingLogger {
    fn debug(&self, message: &str) {
        self.push(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }
}
