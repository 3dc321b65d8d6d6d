use super::corrector::CorrectionVerdict;
use std::collections::HashMap;

/// Per-viewer verdict store, keyed by exact finalized sentence text.
///
/// A sentence is requested at most once per session: `should_request` is
/// false for any text with a pending or resolved entry, so repeated
/// identical sentences (an "Okay." spoken twice) trigger a single external
/// call.
#[derive(Debug, Default)]
pub struct CorrectionCache {
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug)]
enum CacheEntry {
    /// Request dispatched, verdict not yet received
    Pending,
    Resolved(CorrectionVerdict),
}

impl CorrectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved verdict for a sentence, if one has arrived
    pub fn lookup(&self, text: &str) -> Option<&CorrectionVerdict> {
        match self.entries.get(text) {
            Some(CacheEntry::Resolved(verdict)) => Some(verdict),
            _ => None,
        }
    }

    /// True iff no request for this text exists, pending or resolved
    pub fn should_request(&self, text: &str) -> bool {
        !self.entries.contains_key(text)
    }

    /// Reserve the slot before dispatching, so a duplicate arriving while
    /// the first request is in flight is suppressed
    pub fn mark_pending(&mut self, text: impl Into<String>) {
        self.entries.entry(text.into()).or_insert(CacheEntry::Pending);
    }

    /// Store a verdict; overwrites any pending marker or prior verdict
    pub fn record(&mut self, text: impl Into<String>, verdict: CorrectionVerdict) {
        self.entries.insert(text.into(), CacheEntry::Resolved(verdict));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
