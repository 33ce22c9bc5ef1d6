//! History of finished calculations.

use std::collections::VecDeque;

use serde::Serialize;

/// A finished calculation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// The expression as it was displayed when evaluated.
    pub expression: String,
    /// The result as displayed.
    pub result: String,
}

impl HistoryEntry {
    pub fn new(expression: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            result: result.into(),
        }
    }

    /// Get the text to copy to clipboard.
    pub fn text_for_clipboard(&self) -> &str {
        &self.result
    }
}

/// Bounded list of calculations, oldest first.
#[derive(Clone, Debug, Serialize)]
#[serde(transparent)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    #[serde(skip)]
    capacity: usize,
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Append an entry, dropping the oldest one when full.
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
