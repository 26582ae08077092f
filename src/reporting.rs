//! Diagnostic sinks
//!
//! Helpers that need to tell the user something (a fallback was taken, rows
//! were dropped) take a `&dyn Reporter` instead of writing to a global logger.
//! [`LogReporter`] forwards to the `log` facade, [`MemoryReporter`] records
//! messages so callers can inspect them.

use log::Level;
use std::sync::{Mutex, PoisonError};

/// Receiver for diagnostic messages
pub trait Reporter: Send + Sync {
    /// Emit a message at the given level
    fn report(&self, level: Level, message: &str);

    fn warn(&self, message: &str) {
        self.report(Level::Warn, message);
    }

    fn info(&self, message: &str) {
        self.report(Level::Info, message);
    }
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Clone)]
pub struct LogReporter {
    target: &'static str,
}

impl LogReporter {
    /// Create a reporter logging under `target`
    #[must_use]
    pub const fn new(target: &'static str) -> Self {
        Self { target }
    }

    #[must_use]
    pub const fn target(&self) -> &'static str {
        self.target
    }
}

impl Default for LogReporter {
    fn default() -> Self {
        Self::new("clim_diag")
    }
}

impl Reporter for LogReporter {
    fn report(&self, level: Level, message: &str) {
        log::log!(target: self.target, level, "{}", message);
    }
}

/// Records every diagnostic in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries in emission order
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages recorded at `level`
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    /// Number of messages recorded at `level`
    pub fn count(&self, level: Level) -> usize {
        self.messages(level).len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: Level, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}
