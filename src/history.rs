//! Operation log driving undo and redo.

use crate::command::{Command, Options};

/// Snapshot of a successfully applied mutating command, replayable with
/// inverted polarity by flipping `options.cancel`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub command: Command,
    pub options: Options,
}

/// Two stacks: applied commands (most recent on top) and undone ones.
///
/// The undone stack is intentionally not cleared by a new forward command;
/// stale entries re-validate when replayed and fail with the usual collision
/// or not-found message instead of corrupting state.
#[derive(Debug, Default)]
pub struct History {
    applied: Vec<HistoryEntry>,
    undone: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully applied command.
    pub fn record(&mut self, command: Command, options: &Options) {
        self.applied.push(HistoryEntry {
            command,
            options: options.clone(),
        });
    }

    pub fn pop_applied(&mut self) -> Option<HistoryEntry> {
        self.applied.pop()
    }

    pub fn push_undone(&mut self, entry: HistoryEntry) {
        self.undone.push(entry);
    }

    pub fn pop_undone(&mut self) -> Option<HistoryEntry> {
        self.undone.pop()
    }

    pub fn applied_len(&self) -> usize {
        self.applied.len()
    }

    pub fn undone_len(&self) -> usize {
        self.undone.len()
    }
}
