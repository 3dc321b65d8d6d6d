use super::key::{EventKind, StreamKey};
use super::sentence::{split_into_sentences, FinalizedSentence};
use crate::protocol::CaptionEvent;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

const DEFAULT_DISPLAY_WINDOW: usize = 10;

/// Per-viewer state machine reconciling live and final caption events
///
/// Holds one in-flight fragment per stream lane and an append-only
/// finalized history per event kind. Live events replace the lane's
/// fragment wholesale (producers send the cumulative partial, not a
/// delta); final events segment into sentences, append them, and clear
/// the lane.
pub struct SessionReconciler {
    /// In-flight fragment per (kind, source) lane
    fragments: HashMap<StreamKey, String>,

    /// Finalized transcription history, insertion order
    transcriptions: Vec<FinalizedSentence>,

    /// Finalized translation history, insertion order
    translations: Vec<FinalizedSentence>,

    /// How many recent sentences `recent()` exposes per kind
    display_window: usize,
}

impl SessionReconciler {
    pub fn new() -> Self {
        Self::with_display_window(DEFAULT_DISPLAY_WINDOW)
    }

    pub fn with_display_window(display_window: usize) -> Self {
        Self {
            fragments: HashMap::new(),
            transcriptions: Vec::new(),
            translations: Vec::new(),
            display_window,
        }
    }

    /// Apply one caption event, returning any sentences it finalized.
    ///
    /// The returned sentences are exactly those appended to the history by
    /// this call, in order; callers use them to fan out correction
    /// requests.
    pub fn apply(&mut self, kind: EventKind, event: &CaptionEvent) -> Vec<FinalizedSentence> {
        let key = StreamKey::new(kind, &event.input_source);

        if !event.is_final {
            self.apply_live(key, &event.text);
            return Vec::new();
        }

        let trimmed = event.text.trim();
        if trimmed.is_empty() {
            // Final with no text carries no information
            return Vec::new();
        }

        let timestamp = parse_timestamp(event.timestamp.as_deref());

        let mut segments = split_into_sentences(trimmed);
        if segments.is_empty() {
            segments.push(trimmed.to_string());
        }

        let appended: Vec<FinalizedSentence> = segments
            .into_iter()
            .map(|text| FinalizedSentence::new(text, event.input_source.clone(), timestamp))
            .collect();

        debug!(
            kind = ?kind,
            source = %event.input_source,
            count = appended.len(),
            "finalized sentences appended"
        );

        self.history_mut(kind).extend(appended.iter().cloned());
        self.fragments.remove(&key);

        appended
    }

    fn apply_live(&mut self, key: StreamKey, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            // End-of-speech with nothing new: drop the fragment
            self.fragments.remove(&key);
        } else {
            self.fragments.insert(key, trimmed.to_string());
        }
    }

    /// Current in-flight fragment for one lane, if any
    pub fn in_flight(&self, key: StreamKey) -> Option<&str> {
        self.fragments.get(&key).map(String::as_str)
    }

    /// Full finalized history for one kind, oldest first
    pub fn history(&self, kind: EventKind) -> &[FinalizedSentence] {
        match kind {
            EventKind::Transcription => &self.transcriptions,
            EventKind::Translation => &self.translations,
        }
    }

    /// The most recent sentences for one kind, bounded by the display window
    pub fn recent(&self, kind: EventKind) -> &[FinalizedSentence] {
        let history = self.history(kind);
        let start = history.len().saturating_sub(self.display_window);
        &history[start..]
    }

    fn history_mut(&mut self, kind: EventKind) -> &mut Vec<FinalizedSentence> {
        match kind {
            EventKind::Transcription => &mut self.transcriptions,
            EventKind::Translation => &mut self.translations,
        }
    }
}

impl Default for SessionReconciler {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}
