// src/crawl/ledger.rs

//! Visit ledger: the single record of every page a run has scheduled.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::{PageMetadata, Suggestions, VisitRecord};

/// Result of a budget-aware registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// New record created with a count of 1
    First,
    /// Existing record's count incremented
    Repeat,
    /// Ledger already at its limit; nothing changed
    Full,
}

/// Map from normalized URL to its visit record.
///
/// Entries are only ever added or updated, never removed. All access goes
/// through one mutex, so `register_visit` is an atomic check-and-insert.
#[derive(Debug, Default)]
pub struct VisitLedger {
    pages: Mutex<HashMap<String, VisitRecord>>,
}

impl VisitLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn pages(&self) -> MutexGuard<'_, HashMap<String, VisitRecord>> {
        // Every update is a single assignment; a poisoned map is still consistent.
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a sighting of `normalized_url`.
    ///
    /// Returns `true` only for the first sighting, which creates the record
    /// with a count of 1. Later sightings bump the count and return `false`.
    pub fn register_visit(&self, normalized_url: &str) -> bool {
        let mut pages = self.pages();
        if let Some(record) = pages.get_mut(normalized_url) {
            record.count += 1;
            return false;
        }
        pages.insert(normalized_url.to_string(), VisitRecord::first_sighting());
        true
    }

    /// Like [`register_visit`](Self::register_visit), but refuses to grow the
    /// ledger past `limit` records.
    ///
    /// The size check and the insert happen under the same lock. A full
    /// ledger rejects known URLs too, without touching their counts.
    pub fn register_visit_within(&self, normalized_url: &str, limit: usize) -> Registration {
        let mut pages = self.pages();
        if pages.len() >= limit {
            return Registration::Full;
        }
        if let Some(record) = pages.get_mut(normalized_url) {
            record.count += 1;
            return Registration::Repeat;
        }
        pages.insert(normalized_url.to_string(), VisitRecord::first_sighting());
        Registration::First
    }

    /// Number of distinct URLs known.
    pub fn record_count(&self) -> usize {
        self.pages().len()
    }

    /// Store extracted attributes on an existing record; unknown keys are ignored.
    pub fn attach_metadata(&self, normalized_url: &str, metadata: PageMetadata) {
        if let Some(record) = self.pages().get_mut(normalized_url) {
            record.metadata = metadata;
        }
    }

    /// Store content suggestions on an existing record; unknown keys are ignored.
    pub fn attach_suggestions(&self, normalized_url: &str, suggestions: Suggestions) {
        if let Some(record) = self.pages().get_mut(normalized_url) {
            record.suggestions = Some(suggestions);
        }
    }

    pub fn get(&self, normalized_url: &str) -> Option<VisitRecord> {
        self.pages().get(normalized_url).cloned()
    }

    /// Consistent copy of every record.
    pub fn snapshot(&self) -> HashMap<String, VisitRecord> {
        self.pages().clone()
    }
}
