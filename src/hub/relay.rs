use super::peer::{PeerHandle, PeerId};
use crate::correction::CorrectionJob;
use crate::protocol::{CorrectionRequest, Greeting, WireMessage};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};

const GREETING: &str = "Connected to transcription server";

/// Outcome of classifying one inbound frame
#[derive(Debug)]
pub enum HubAction {
    /// Re-stamped frame, ready to fan out to every other ready peer
    Broadcast(String),

    /// Correction request, routed to the worker side-channel
    Correction(CorrectionRequest),

    /// Unusable frame; logged and ignored, connection stays open
    Drop,
}

/// Owns the connected-peer set and relays frames between peers.
///
/// Peers are registered on connect and removed on disconnect or transport
/// error; nothing else mutates the set. A peer's own frames are never
/// echoed back to it.
pub struct RelayHub {
    peers: RwLock<HashMap<PeerId, PeerHandle>>,
    correction_tx: mpsc::UnboundedSender<CorrectionJob>,
}

impl RelayHub {
    pub fn new(correction_tx: mpsc::UnboundedSender<CorrectionJob>) -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
            correction_tx,
        }
    }

    /// Register a new peer and greet it.
    ///
    /// Returns the peer's id and the receiving end of its outbound frame
    /// queue; the transport layer drains that queue onto the socket.
    pub async fn connect(&self) -> (PeerId, mpsc::UnboundedReceiver<String>) {
        let id = PeerId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = PeerHandle::new(id, tx);

        // Greeting goes to this peer only; it is not a broadcast
        let greeting = WireMessage::Connection(Greeting {
            message: GREETING.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        });
        handle.send(greeting.to_json());

        let total = {
            let mut peers = self.peers.write().await;
            peers.insert(id, handle);
            peers.len()
        };

        info!("New peer connected: {} (total: {})", id, total);

        (id, rx)
    }

    /// Remove a peer after close or transport error
    pub async fn disconnect(&self, id: PeerId) {
        let total = {
            let mut peers = self.peers.write().await;
            peers.remove(&id);
            peers.len()
        };

        info!("Peer disconnected: {} (total: {})", id, total);
    }

    /// Handle one inbound text frame from a connected peer
    pub async fn handle_message(&self, from: PeerId, raw: &str) {
        match Self::classify(raw) {
            HubAction::Broadcast(frame) => {
                self.broadcast_from(from, frame).await;
            }
            HubAction::Correction(request) => {
                let job = CorrectionJob {
                    peer_id: from,
                    sentence_id: request.sentence_id,
                    sentence: request.sentence,
                };
                if self.correction_tx.send(job).is_err() {
                    warn!("Correction worker unavailable, dropping request");
                }
            }
            HubAction::Drop => {}
        }
    }

    /// Classify a raw frame and stamp broadcastable ones with the server
    /// clock.
    ///
    /// The frame is kept as generic JSON so producer-supplied fields
    /// survive the relay untouched; only `timestamp` is overwritten,
    /// guaranteeing one consistent clock across all viewers.
    pub fn classify(raw: &str) -> HubAction {
        let mut value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Error processing message: {}", e);
                return HubAction::Drop;
            }
        };

        let is_correction =
            value.get("type").and_then(Value::as_str) == Some("correction_request");

        if is_correction {
            return match serde_json::from_value::<WireMessage>(value) {
                Ok(WireMessage::CorrectionRequest(request)) => HubAction::Correction(request),
                _ => {
                    warn!("Malformed correction request dropped");
                    HubAction::Drop
                }
            };
        }

        match value.as_object_mut() {
            Some(object) => {
                object.insert(
                    "timestamp".to_string(),
                    Value::String(Utc::now().to_rfc3339()),
                );
            }
            None => {
                warn!("Non-object frame dropped");
                return HubAction::Drop;
            }
        }

        HubAction::Broadcast(value.to_string())
    }

    /// Fan a frame out to every ready peer except the sender.
    ///
    /// Peers whose transport is not ready are skipped, never errored.
    /// Returns the delivery count.
    pub async fn broadcast_from(&self, from: PeerId, frame: String) -> usize {
        let peers = self.peers.read().await;
        let mut delivered = 0;

        for (id, handle) in peers.iter() {
            if *id == from || !handle.is_ready() {
                continue;
            }
            if handle.send(frame.clone()) {
                delivered += 1;
            }
        }

        info!("Broadcasted to {} peers", delivered);
        delivered
    }

    /// Deliver a frame to one specific peer; false if it is gone
    pub async fn send_to(&self, id: PeerId, frame: String) -> bool {
        let peers = self.peers.read().await;
        match peers.get(&id) {
            Some(handle) if handle.is_ready() => handle.send(frame),
            _ => false,
        }
    }

    pub async fn peer_count(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Drop every peer's outbound queue, closing their connections
    pub async fn close_all(&self) {
        let mut peers = self.peers.write().await;
        let total = peers.len();
        peers.clear();
        info!("Closed {} peer connections", total);
    }
}
