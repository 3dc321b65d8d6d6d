use std::fmt;
use tokio::sync::mpsc;

/// Connection-scoped peer identity; never reused across reconnects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(uuid::Uuid);

impl PeerId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for PeerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Write half of one connected peer, as seen by the hub
#[derive(Debug)]
pub struct PeerHandle {
    id: PeerId,
    outbound: mpsc::UnboundedSender<String>,
}

impl PeerHandle {
    pub fn new(id: PeerId, outbound: mpsc::UnboundedSender<String>) -> Self {
        Self { id, outbound }
    }

    pub fn id(&self) -> PeerId {
        self.id
    }

    /// Whether the transport is still accepting frames
    pub fn is_ready(&self) -> bool {
        !self.outbound.is_closed()
    }

    /// Queue a frame for delivery; false if the transport is gone
    pub fn send(&self, frame: String) -> bool {
        self.outbound.send(frame).is_ok()
    }
}
