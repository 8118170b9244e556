//! Shared application state held by the HTTP server.

use std::sync::Arc;

use chain::{Engine, PeerClient};
use tokio::sync::Mutex;

/// Shared state passed to every request handler via axum's `State` extractor.
pub struct AppState {
    /// The engine: chain, mempool, peer set, and flags, all behind one lock.
    pub engine: Mutex<Engine>,
    /// HTTP client used to gossip and reconcile with peers.
    pub peer_client: PeerClient,
}

pub type SharedState = Arc<AppState>;
