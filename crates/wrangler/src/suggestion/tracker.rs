//! Status tracking across repeated suggestion runs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Suggestion, SuggestionStatus};

/// Count of suggestions by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub applied: usize,
    pub dismissed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.applied + self.dismissed
    }
}

/// Remembers suggestion statuses by id.
///
/// Generation is stateless and may return a suggestion that was already
/// handled; [`SuggestionTracker::filter_new`] hides those.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionTracker {
    statuses: IndexMap<String, SuggestionStatus>,
}

impl SuggestionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop suggestions already applied or dismissed and start tracking the
    /// rest as pending.
    pub fn filter_new(&mut self, suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
        let mut fresh = Vec::with_capacity(suggestions.len());
        for suggestion in suggestions {
            let status = self
                .statuses
                .entry(suggestion.id.clone())
                .or_insert(SuggestionStatus::Pending);
            if !status.is_decided() {
                fresh.push(suggestion);
            }
        }
        fresh
    }

    pub fn status(&self, id: &str) -> Option<SuggestionStatus> {
        self.statuses.get(id).copied()
    }

    /// Mark a suggestion applied. Returns false if it was already decided.
    pub fn mark_applied(&mut self, id: &str) -> bool {
        self.transition(id, SuggestionStatus::Applied)
    }

    /// Mark a suggestion dismissed. Returns false if it was already decided.
    pub fn dismiss(&mut self, id: &str) -> bool {
        self.transition(id, SuggestionStatus::Dismissed)
    }

    fn transition(&mut self, id: &str, to: SuggestionStatus) -> bool {
        let status = self
            .statuses
            .entry(id.to_string())
            .or_insert(SuggestionStatus::Pending);
        if status.is_decided() {
            return false;
        }
        *status = to;
        true
    }

    /// Copy tracked statuses onto suggestions.
    pub fn annotate(&self, suggestions: &mut [Suggestion]) {
        for suggestion in suggestions {
            if let Some(status) = self.status(&suggestion.id) {
                suggestion.status = status;
            }
        }
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for status in self.statuses.values() {
            match status {
                SuggestionStatus::Pending => counts.pending += 1,
                SuggestionStatus::Applied => counts.applied += 1,
                SuggestionStatus::Dismissed => counts.dismissed += 1,
            }
        }
        counts
    }

    /// Forget every status, e.g. after a new import.
    pub fn clear(&mut self) {
        self.statuses.clear();
    }
}
