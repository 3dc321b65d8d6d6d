use crate::protocol::{CaptionEvent, CorrectionRequest, WireMessage};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{info, warn};

/// WebSocket transport for a producer or headless viewer.
///
/// Maintains one connection to the relay, retrying on a fixed interval
/// after an unexpected close. Reconnection is a liveness property only:
/// no message history is replayed. Sends while disconnected are logged
/// and skipped, matching best-effort delivery semantics.
pub struct RelayClient {
    outbound: mpsc::UnboundedSender<WireMessage>,
    connected: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl RelayClient {
    /// Start the connection loop.
    ///
    /// Returns the client handle and the stream of inbound messages.
    pub fn connect(
        url: impl Into<String>,
        reconnect_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<WireMessage>) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(false));

        let task = tokio::spawn(connection_loop(
            url.into(),
            reconnect_interval,
            out_rx,
            in_tx,
            Arc::clone(&connected),
        ));

        (
            Self {
                outbound: out_tx,
                connected,
                task,
            },
            in_rx,
        )
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Queue a message for the relay; skipped with a log line when the
    /// connection is down
    pub fn send(&self, message: WireMessage) {
        if !self.is_connected() {
            info!("Not connected, skipping send");
            return;
        }
        if self.outbound.send(message).is_err() {
            warn!("Transport task gone, message dropped");
        }
    }

    pub fn send_transcription(&self, text: impl Into<String>, is_final: bool, source: impl Into<String>) {
        self.send(WireMessage::Transcription(CaptionEvent {
            text: text.into(),
            is_final,
            input_source: source.into(),
            timestamp: None,
        }));
    }

    pub fn send_translation(&self, text: impl Into<String>, is_final: bool, source: impl Into<String>) {
        self.send(WireMessage::Translation(CaptionEvent {
            text: text.into(),
            is_final,
            input_source: source.into(),
            timestamp: None,
        }));
    }

    pub fn request_correction(&self, sentence_id: u64, sentence: impl Into<String>) {
        self.send(WireMessage::CorrectionRequest(CorrectionRequest {
            sentence_id,
            sentence: sentence.into(),
        }));
    }

    /// Stop the connection loop and drop the socket
    pub fn shutdown(self) {
        self.task.abort();
        info!("Relay client stopped");
    }
}

async fn connection_loop(
    url: String,
    reconnect_interval: Duration,
    mut outbound: mpsc::UnboundedReceiver<WireMessage>,
    inbound: mpsc::UnboundedSender<WireMessage>,
    connected: Arc<AtomicBool>,
) {
    loop {
        match connect_async(url.as_str()).await {
            Ok((socket, _)) => {
                info!("Connected to {}", url);
                connected.store(true, Ordering::SeqCst);

                let closed = pump(socket, &mut outbound, &inbound).await;
                connected.store(false, Ordering::SeqCst);

                if closed {
                    // Caller dropped its handles; nothing left to serve
                    return;
                }
                warn!("Connection to {} closed", url);
            }
            Err(e) => {
                warn!("Connection to {} failed: {}", url, e);
            }
        }

        info!("Reconnecting in {} seconds...", reconnect_interval.as_secs());
        sleep(reconnect_interval).await;
    }
}

/// Run one established connection until it drops.
///
/// Returns true when the caller side is gone and the loop should exit for
/// good rather than reconnect.
async fn pump(
    socket: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    outbound: &mut mpsc::UnboundedReceiver<WireMessage>,
    inbound: &mpsc::UnboundedSender<WireMessage>,
) -> bool {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<WireMessage>(&text) {
                    Ok(message) => {
                        if inbound.send(message).is_err() {
                            return true;
                        }
                    }
                    Err(e) => warn!("Parse error: {}", e),
                },
                Some(Ok(Message::Close(_))) | None => return false,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Transport error: {}", e);
                    return false;
                }
            },
            message = outbound.recv() => match message {
                Some(message) => {
                    let frame = Message::Text(message.to_json());
                    if sink.send(frame).await.is_err() {
                        return false;
                    }
                }
                None => return true,
            },
        }
    }
}
