use crate::correction::{CorrectionCache, CorrectionVerdict};
use crate::protocol::{CorrectionRequest, WireMessage};
use crate::session::{EventKind, SessionReconciler};
use tracing::{debug, info};

/// Viewer-side message pump: reconciler plus correction cache.
///
/// `handle_message` consumes one inbound message and returns the
/// correction requests the viewer should send back, already de-duplicated
/// against the cache. With correction disabled no requests are ever
/// produced; stale verdicts stay cached but unused.
pub struct ViewerSession {
    reconciler: SessionReconciler,
    cache: CorrectionCache,
    correction_enabled: bool,
    next_sentence_id: u64,
}

impl ViewerSession {
    pub fn new(correction_enabled: bool) -> Self {
        Self {
            reconciler: SessionReconciler::new(),
            cache: CorrectionCache::new(),
            correction_enabled,
            next_sentence_id: 0,
        }
    }

    pub fn with_display_window(correction_enabled: bool, display_window: usize) -> Self {
        Self {
            reconciler: SessionReconciler::with_display_window(display_window),
            ..Self::new(correction_enabled)
        }
    }

    /// Apply one inbound message; returns correction requests to send
    pub fn handle_message(&mut self, message: &WireMessage) -> Vec<WireMessage> {
        match message {
            WireMessage::Connection(greeting) => {
                info!("{}", greeting.message);
                Vec::new()
            }
            WireMessage::Transcription(event) => {
                let finalized = self.reconciler.apply(EventKind::Transcription, event);
                self.correction_requests_for(finalized.iter().map(|s| s.text.as_str()))
            }
            WireMessage::Translation(event) => {
                // Translations render as-is; only transcriptions are checked
                self.reconciler.apply(EventKind::Translation, event);
                Vec::new()
            }
            WireMessage::CorrectionResponse(response) => {
                debug!(
                    original = %response.original,
                    status = ?response.status,
                    "correction stored"
                );
                self.cache.record(
                    response.original.clone(),
                    CorrectionVerdict {
                        status: response.status,
                        corrected: response.corrected.clone(),
                        error: response.error.clone(),
                    },
                );
                Vec::new()
            }
            // Server-bound; a viewer never receives these
            WireMessage::CorrectionRequest(_) => Vec::new(),
        }
    }

    fn correction_requests_for<'a>(
        &mut self,
        sentences: impl Iterator<Item = &'a str>,
    ) -> Vec<WireMessage> {
        if !self.correction_enabled {
            return Vec::new();
        }

        let mut requests = Vec::new();
        for text in sentences {
            if !self.cache.should_request(text) {
                continue;
            }
            self.cache.mark_pending(text);

            let sentence_id = self.next_sentence_id;
            self.next_sentence_id += 1;

            requests.push(WireMessage::CorrectionRequest(CorrectionRequest {
                sentence_id,
                sentence: text.to_string(),
            }));
        }
        requests
    }

    /// Annotation for a rendered sentence, if its verdict has arrived
    pub fn verdict_for(&self, text: &str) -> Option<&CorrectionVerdict> {
        self.cache.lookup(text)
    }

    pub fn reconciler(&self) -> &SessionReconciler {
        &self.reconciler
    }

    pub fn cache(&self) -> &CorrectionCache {
        &self.cache
    }
}
