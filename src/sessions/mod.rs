//! In-memory peer registry for `WebRTC` signaling.
//!
//! Peers that connect with the same session code form a session. Every message a peer
//! sends is relayed to all other peers of that session. Sessions exist only while they
//! have at least one peer.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Outbound message channel of a single `WebSocket` peer.
pub type WsTx = mpsc::UnboundedSender<String>;

/// Tracks all connected peers across all signaling sessions.
#[derive(Debug, Clone, Default)]
pub struct PeerRegistry {
    /// session code → peer id → sender channel
    sessions: Arc<DashMap<String, DashMap<Uuid, WsTx>>>,
}

impl PeerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Add a peer to a session, creating the session on first join.
    pub fn join(&self, code: &str, peer: Uuid, tx: WsTx) {
        self.sessions
            .entry(code.to_string())
            .or_default()
            .insert(peer, tx);
    }

    /// Remove a peer, and the session with it once it is empty.
    pub fn leave(&self, code: &str, peer: Uuid) {
        // Holding the entry keeps the empty-check and removal atomic with concurrent joins.
        if let dashmap::mapref::entry::Entry::Occupied(entry) =
            self.sessions.entry(code.to_string())
        {
            entry.get().remove(&peer);
            if entry.get().is_empty() {
                entry.remove();
            }
        }
    }

    /// Relay a message to every peer of the session except `sender`.
    ///
    /// Returns the number of peers the message was queued for.
    pub fn broadcast_except(&self, code: &str, sender: Uuid, message: &str) -> usize {
        let Some(peers) = self.sessions.get(code) else {
            return 0;
        };
        let mut delivered = 0;
        for entry in peers.iter() {
            if *entry.key() != sender && entry.value().send(message.to_string()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    #[must_use]
    pub fn peer_count(&self, code: &str) -> usize {
        self.sessions.get(code).map_or(0, |peers| peers.len())
    }

    #[must_use]
    pub fn has_session(&self, code: &str) -> bool {
        self.sessions.contains_key(code)
    }
}
