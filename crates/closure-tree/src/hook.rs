//! Statement interception.
//!
//! Every SQL statement the engine issues passes through a single executor,
//! which reports the statement text (with bound parameters already expanded)
//! to an optional [`StatementHook`]. [`StatementRecorder`] keeps them in memory
//! so a caller can show exactly what an operation did to the database.

use parking_lot::Mutex;

/// Receives each statement after it has been executed.
pub trait StatementHook: Send + Sync {
    fn on_statement(&self, sql: &str);
}

/// A [`StatementHook`] that appends every statement to an in-memory list.
#[derive(Debug, Default)]
pub struct StatementRecorder {
    records: Mutex<Vec<String>>,
}

impl StatementRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// All statements recorded since creation or the last [`reset`](Self::reset).
    pub fn executed(&self) -> Vec<String> {
        self.records.lock().clone()
    }

    /// Removes and returns the recorded statements.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.records.lock())
    }

    pub fn reset(&self) {
        self.records.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl StatementHook for StatementRecorder {
    fn on_statement(&self, sql: &str) {
        self.records.lock().push(sql.to_string());
    }
}
