use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use crate::state::AppState;

/// `GET /session/{code}`: `WebRTC` signaling relay.
pub fn router() -> Router<AppState> {
    Router::new().route("/session/{code}", get(ws_upgrade))
}

async fn ws_upgrade(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_peer(state, code, socket))
}

/// Relay every JSON text frame from this peer to the other peers of the session.
async fn handle_peer(state: AppState, code: String, socket: WebSocket) {
    let peer = Uuid::new_v4();
    let (mut ws_sink, mut ws_stream) = socket.split();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();

    state.peers.join(&code, peer, tx);
    tracing::info!(%code, %peer, peers = state.peers.peer_count(&code), "Peer joined session");

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sink.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = ws_stream.next().await {
        match msg {
            Message::Text(text) => {
                if serde_json::from_str::<serde_json::Value>(&text).is_err() {
                    tracing::debug!(%code, %peer, "Ignoring non-JSON signaling frame");
                    continue;
                }
                let delivered = state.peers.broadcast_except(&code, peer, &text);
                tracing::debug!(%code, %peer, delivered, "Relayed signaling message");
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    send_task.abort();
    state.peers.leave(&code, peer);
    tracing::info!(%code, %peer, "Peer left session");
}
