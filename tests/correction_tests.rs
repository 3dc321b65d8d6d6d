// Tests for the correction side-channel: cache idempotence, worker
// routing with a scripted provider, and the viewer-side request flow.

use async_trait::async_trait;
use caption_relay::client::ViewerSession;
use caption_relay::correction::{
    CorrectionCache, CorrectionError, CorrectionVerdict, CorrectionWorker, SentenceCorrector,
};
use caption_relay::hub::RelayHub;
use caption_relay::protocol::{CaptionEvent, VerdictStatus, WireMessage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Deterministic in-process provider; counts external calls
struct ScriptedCorrector {
    calls: AtomicUsize,
    fail: bool,
}

impl ScriptedCorrector {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail,
        })
    }
}

#[async_trait]
impl SentenceCorrector for ScriptedCorrector {
    async fn correct(&self, sentence: &str) -> Result<CorrectionVerdict, CorrectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(CorrectionError::Parse("unparseable provider output".into()));
        }

        if sentence == "He go to school." {
            Ok(CorrectionVerdict {
                status: VerdictStatus::Bad,
                corrected: Some("He goes to school.".to_string()),
                error: None,
            })
        } else {
            Ok(CorrectionVerdict {
                status: VerdictStatus::Good,
                corrected: None,
                error: None,
            })
        }
    }
}

fn good_verdict() -> CorrectionVerdict {
    CorrectionVerdict {
        status: VerdictStatus::Good,
        corrected: None,
        error: None,
    }
}

fn final_transcription(text: &str) -> WireMessage {
    WireMessage::Transcription(CaptionEvent {
        text: text.to_string(),
        is_final: true,
        input_source: "Host".to_string(),
        timestamp: None,
    })
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[test]
fn test_cache_lookup_misses_until_recorded() {
    let mut cache = CorrectionCache::new();
    assert!(cache.lookup("Okay.").is_none());
    assert!(cache.should_request("Okay."));

    cache.record("Okay.", good_verdict());
    assert_eq!(cache.lookup("Okay.").unwrap().status, VerdictStatus::Good);
    assert!(!cache.should_request("Okay."));
}

#[test]
fn test_cache_pending_suppresses_duplicates() {
    let mut cache = CorrectionCache::new();

    cache.mark_pending("Okay.");
    assert!(!cache.should_request("Okay."), "in-flight text must not re-request");
    assert!(cache.lookup("Okay.").is_none(), "pending is not a verdict");

    cache.record("Okay.", good_verdict());
    assert!(cache.lookup("Okay.").is_some());
}

#[test]
fn test_cache_record_overwrites() {
    let mut cache = CorrectionCache::new();
    cache.record("text", good_verdict());
    cache.record("text", CorrectionVerdict::error("retry failed"));

    assert_eq!(cache.lookup("text").unwrap().status, VerdictStatus::Error);
    assert_eq!(cache.len(), 1);
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

async fn recv_response(rx: &mut mpsc::UnboundedReceiver<String>) -> WireMessage {
    let frame = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for response")
        .expect("channel closed");
    serde_json::from_str(&frame).expect("response should parse")
}

#[tokio::test]
async fn test_worker_answers_only_the_requesting_peer() {
    let (job_tx, job_rx) = mpsc::unbounded_channel();
    let hub = Arc::new(RelayHub::new(job_tx));
    let corrector = ScriptedCorrector::new(false);

    tokio::spawn(CorrectionWorker::new(corrector, Arc::clone(&hub)).run(job_rx));

    let (a, mut a_rx) = hub.connect().await;
    let (_b, mut b_rx) = hub.connect().await;
    a_rx.recv().await.unwrap(); // greetings
    b_rx.recv().await.unwrap();

    let raw = r#"{"type":"correction_request","sentenceId":2,"sentence":"He go to school."}"#;
    hub.handle_message(a, raw).await;

    match recv_response(&mut a_rx).await {
        WireMessage::CorrectionResponse(response) => {
            assert_eq!(response.sentence_id, 2);
            assert_eq!(response.status, VerdictStatus::Bad);
            assert_eq!(response.original, "He go to school.");
            assert_eq!(response.corrected.as_deref(), Some("He goes to school."));
            assert!(response.error.is_none());
            assert!(!response.timestamp.is_empty());
        }
        other => panic!("expected correction response, got {:?}", other),
    }

    assert!(b_rx.try_recv().is_err(), "response must not be broadcast");
}

#[tokio::test]
async fn test_worker_folds_provider_failure_into_error_verdict() {
    let (job_tx, job_rx) = mpsc::unbounded_channel();
    let hub = Arc::new(RelayHub::new(job_tx));
    let corrector = ScriptedCorrector::new(true);

    tokio::spawn(CorrectionWorker::new(corrector, Arc::clone(&hub)).run(job_rx));

    let (a, mut a_rx) = hub.connect().await;
    a_rx.recv().await.unwrap();

    let raw = r#"{"type":"correction_request","sentenceId":5,"sentence":"Whatever was said."}"#;
    hub.handle_message(a, raw).await;

    match recv_response(&mut a_rx).await {
        WireMessage::CorrectionResponse(response) => {
            assert_eq!(response.status, VerdictStatus::Error);
            assert_eq!(response.original, "Whatever was said.");
            assert!(response.corrected.is_none());
            assert!(!response.error.unwrap().is_empty());
        }
        other => panic!("expected correction response, got {:?}", other),
    }
}

#[tokio::test]
async fn test_worker_tolerates_departed_requester() {
    let (job_tx, job_rx) = mpsc::unbounded_channel();
    let hub = Arc::new(RelayHub::new(job_tx));
    let corrector = ScriptedCorrector::new(false);

    let provider: Arc<dyn SentenceCorrector> = Arc::clone(&corrector) as Arc<dyn SentenceCorrector>;
    tokio::spawn(CorrectionWorker::new(provider, Arc::clone(&hub)).run(job_rx));

    let (a, a_rx) = hub.connect().await;
    let raw = r#"{"type":"correction_request","sentenceId":1,"sentence":"Okay."}"#;
    hub.handle_message(a, raw).await;

    drop(a_rx);
    hub.disconnect(a).await;

    // The call still completes; the send is a silent no-op
    timeout(Duration::from_secs(1), async {
        while corrector.calls.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("provider call should still run");
}

// ---------------------------------------------------------------------------
// Viewer flow
// ---------------------------------------------------------------------------

#[test]
fn test_viewer_requests_each_new_sentence_once() {
    let mut viewer = ViewerSession::new(true);

    let requests = viewer.handle_message(&final_transcription("He go to school. Okay."));
    assert_eq!(requests.len(), 2);

    // The same burst again: both sentences are pending, nothing new goes out
    let requests = viewer.handle_message(&final_transcription("He go to school. Okay."));
    assert!(requests.is_empty(), "pending texts must not re-request");
}

#[test]
fn test_viewer_request_ids_are_distinct() {
    let mut viewer = ViewerSession::new(true);
    let requests = viewer.handle_message(&final_transcription("One. Two. Three."));

    let ids: Vec<u64> = requests
        .iter()
        .map(|m| match m {
            WireMessage::CorrectionRequest(r) => r.sentence_id,
            other => panic!("expected request, got {:?}", other),
        })
        .collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn test_viewer_records_response_and_annotates() {
    let mut viewer = ViewerSession::new(true);
    viewer.handle_message(&final_transcription("He go to school."));

    let response = WireMessage::CorrectionResponse(caption_relay::protocol::CorrectionResponse {
        sentence_id: 0,
        status: VerdictStatus::Bad,
        original: "He go to school.".to_string(),
        corrected: Some("He goes to school.".to_string()),
        timestamp: "2026-08-30T10:00:00Z".to_string(),
        error: None,
    });
    assert!(viewer.handle_message(&response).is_empty());

    let verdict = viewer.verdict_for("He go to school.").unwrap();
    assert_eq!(verdict.status, VerdictStatus::Bad);
    assert_eq!(verdict.corrected.as_deref(), Some("He goes to school."));

    // Resolved text is still never re-requested
    let requests = viewer.handle_message(&final_transcription("He go to school."));
    assert!(requests.is_empty());
}

#[test]
fn test_viewer_error_verdict_leaves_sentence_unannotated() {
    let mut viewer = ViewerSession::new(true);
    viewer.handle_message(&final_transcription("Garbled burst"));

    let response = WireMessage::CorrectionResponse(caption_relay::protocol::CorrectionResponse {
        sentence_id: 0,
        status: VerdictStatus::Error,
        original: "Garbled burst".to_string(),
        corrected: None,
        timestamp: "2026-08-30T10:00:00Z".to_string(),
        error: Some("no JSON found in provider response".to_string()),
    });
    viewer.handle_message(&response);

    let verdict = viewer.verdict_for("Garbled burst").unwrap();
    assert_eq!(verdict.status, VerdictStatus::Error);
    assert!(verdict.corrected.is_none(), "viewer renders the original text");
}

#[test]
fn test_viewer_with_correction_disabled_requests_nothing() {
    let mut viewer = ViewerSession::new(false);
    let requests = viewer.handle_message(&final_transcription("He go to school."));

    assert!(requests.is_empty());
    assert!(viewer.cache().is_empty());
    // The transcript itself still reconciles
    assert_eq!(
        viewer
            .reconciler()
            .history(caption_relay::session::EventKind::Transcription)
            .len(),
        1
    );
}

#[test]
fn test_viewer_ignores_translations_for_correction() {
    let mut viewer = ViewerSession::new(true);
    let requests = viewer.handle_message(&WireMessage::Translation(CaptionEvent {
        text: "Il va a l'ecole.".to_string(),
        is_final: true,
        input_source: "Host".to_string(),
        timestamp: None,
    }));

    assert!(requests.is_empty());
    assert!(viewer.cache().is_empty());
}

#[test]
fn test_response_for_scrolled_out_sentence_still_cached() {
    // Display window of 1: the first sentence scrolls out immediately
    let mut viewer = ViewerSession::with_display_window(true, 1);
    viewer.handle_message(&final_transcription("First one. Second one."));

    let response = WireMessage::CorrectionResponse(caption_relay::protocol::CorrectionResponse {
        sentence_id: 0,
        status: VerdictStatus::Good,
        original: "First one.".to_string(),
        corrected: None,
        timestamp: "2026-08-30T10:00:00Z".to_string(),
        error: None,
    });
    viewer.handle_message(&response);

    // Out of the display window, but the cache updated regardless
    let recent = viewer
        .reconciler()
        .recent(caption_relay::session::EventKind::Transcription);
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].text, "Second one.");
    assert!(viewer.verdict_for("First one.").is_some());
}
