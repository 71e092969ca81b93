//! Error texts that have already reached the chat once.

#![allow(missing_docs)]

use std::collections::HashSet;

/// Grow-only set of delivered error notices.
#[derive(Debug, Default, Clone)]
pub struct DedupLedger {
    delivered: HashSet<String>,
}

impl DedupLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `text` was not recorded before.
    pub fn record(&mut self, text: &str) -> bool {
        if self.delivered.contains(text) {
            return false;
        }
        self.delivered.insert(text.to_string())
    }

    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.delivered.contains(text)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.delivered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.delivered.is_empty()
    }
}
