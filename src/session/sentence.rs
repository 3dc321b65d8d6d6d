use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single finalized sentence in the transcript history
///
/// Immutable once created. Sentences are appended in arrival order and
/// never reordered or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizedSentence {
    /// Unique id, never reused
    pub id: uuid::Uuid,

    /// Sentence text, trimmed
    pub text: String,

    /// Input source tag as received (e.g. "Host")
    pub source: String,

    /// When the fragment was finalized
    pub timestamp: DateTime<Utc>,
}

impl FinalizedSentence {
    pub fn new(text: impl Into<String>, source: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            text: text.into(),
            source: source.into(),
            timestamp,
        }
    }
}

/// Split a finalized burst into sentence-like segments.
///
/// Speech engines finalize in bursts that may span several grammatical
/// sentences; correction and display operate at sentence granularity.
/// Each segment runs up to and including its terminator (`.` `!` `?`),
/// trimmed; a trailing run with no terminator is kept as its own segment;
/// segments with no text before the terminator are dropped.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if matches!(ch, '.' | '!' | '?') {
            if !current.trim().is_empty() {
                current.push(ch);
                sentences.push(current.trim().to_string());
            }
            current.clear();
        } else {
            current.push(ch);
        }
    }

    if !current.trim().is_empty() {
        sentences.push(current.trim().to_string());
    }

    sentences
}
