//! Per-viewer transcript reconciliation
//!
//! This module turns the ordered stream of caption events into a consistent
//! view: an append-only history of finalized sentences per event kind, plus
//! the current in-flight (still mutable) fragment per stream lane. Host and
//! speaker fragments for the same kind never merge.

mod key;
mod reconciler;
mod sentence;

pub use key::{EventKind, InputSource, StreamKey};
pub use reconciler::SessionReconciler;
pub use sentence::{split_into_sentences, FinalizedSentence};
