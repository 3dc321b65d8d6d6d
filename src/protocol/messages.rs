use serde::{Deserialize, Serialize};

/// Server greeting sent to a peer right after it connects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Greeting {
    pub message: String,
    pub timestamp: String, // RFC3339 timestamp
}

/// A live or finalized speech fragment from a producer
///
/// Producers may leave `timestamp` unset (or null); the relay stamps it at
/// receipt time before fanning the event out, so every viewer sees the same
/// clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionEvent {
    pub text: String,
    pub is_final: bool,
    pub input_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Viewer request to grammar-check one finalized sentence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionRequest {
    #[serde(rename = "sentenceId")]
    pub sentence_id: u64,
    pub sentence: String,
}

/// Grammar verdict, sent back to the requesting viewer only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionResponse {
    #[serde(rename = "sentenceId")]
    pub sentence_id: u64,
    pub status: VerdictStatus,
    pub original: String,
    pub corrected: Option<String>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of a grammar check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    /// Sentence is fine as spoken
    Good,
    /// Sentence has errors; `corrected` carries the fixed version
    Bad,
    /// Provider call failed; sentence rendered unannotated
    Error,
}

/// One WebSocket text frame, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireMessage {
    Connection(Greeting),
    Transcription(CaptionEvent),
    Translation(CaptionEvent),
    CorrectionRequest(CorrectionRequest),
    CorrectionResponse(CorrectionResponse),
}

impl WireMessage {
    /// Serialize for the wire; wire messages contain no non-JSON types
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
