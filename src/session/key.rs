use serde::{Deserialize, Serialize};

/// Which logical stream an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Transcription,
    Translation,
}

/// Logical origin of an audio stream
///
/// Anything that is not "host" (case-insensitive) counts as the speaker
/// lane, so producers are free to tag with device names or display labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputSource {
    Host,
    Speaker,
}

impl InputSource {
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("host") {
            InputSource::Host
        } else {
            InputSource::Speaker
        }
    }
}

/// Identifies one independent in-flight fragment lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamKey {
    pub kind: EventKind,
    pub source: InputSource,
}

impl StreamKey {
    pub fn new(kind: EventKind, raw_source: &str) -> Self {
        Self {
            kind,
            source: InputSource::parse(raw_source),
        }
    }
}
