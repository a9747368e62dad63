// Per-function source records: the pristine original plus a bounded stack
// of recent pre-images.

use std::collections::{HashMap, VecDeque};

use crate::runtime::FuncId;

/// Undo depth per function. Deliberate policy: `revert` covers recent
/// interactive tweaks only, while `restore` to pristine is always available.
pub const HISTORY_DEPTH: usize = 3;

/// Holds original and recent-history source text keyed by function identity.
#[derive(Debug, Default)]
pub struct SourceStore {
    original: HashMap<FuncId, String>,
    history: HashMap<FuncId, VecDeque<String>>,
}

impl SourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pre-image before a mutation takes effect. The first snapshot
    /// for a function also fixes its original source, never overwritten.
    pub fn snapshot(&mut self, id: FuncId, source: &str) {
        self.original
            .entry(id)
            .or_insert_with(|| source.to_string());
        let stack = self.history.entry(id).or_default();
        if stack.len() == HISTORY_DEPTH {
            stack.pop_front();
        }
        stack.push_back(source.to_string());
    }

    /// Source as it existed before the first modification, if any.
    pub fn original(&self, id: FuncId) -> Option<&str> {
        self.original.get(&id).map(String::as_str)
    }

    /// Pop the newest pre-image.
    pub fn pop_history(&mut self, id: FuncId) -> Option<String> {
        self.history.get_mut(&id)?.pop_back()
    }

    pub fn clear_history(&mut self, id: FuncId) {
        self.history.remove(&id);
    }

    pub fn history_len(&self, id: FuncId) -> usize {
        self.history.get(&id).map_or(0, VecDeque::len)
    }
}
