use super::state::AppState;
use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

/// GET /ws
/// Upgrade the connection and hand the socket to the relay hub
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one peer connection: drain the hub's outbound queue onto the
/// socket, feed inbound text frames into the hub, deregister on any exit.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (peer_id, mut outbound) = state.hub.connect().await;

    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if sink.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => state.hub.handle_message(peer_id, &text).await,
            Ok(Message::Close(_)) => break,
            Ok(_) => {
                // Binary, ping and pong frames carry no protocol messages
                debug!(peer_id = %peer_id, "ignoring non-text frame");
            }
            Err(e) => {
                warn!("Peer {} transport error: {}", peer_id, e);
                break;
            }
        }
    }

    state.hub.disconnect(peer_id).await;
    writer.abort();
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
