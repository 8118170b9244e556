//! Peer HTTP client: block/transaction gossip, chain resolution, node discovery.
//!
//! Every call here is best-effort and bounded by a timeout; failures are
//! logged and swallowed by the caller, never propagated as a hard error that
//! would stall the gossip loop.

use std::time::Duration;

use rand::seq::SliceRandom;

use crate::canonical::canon;
use crate::types::{Block, Transaction};

/// Default per-request timeout for outbound peer HTTP calls.
pub const PEER_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin async HTTP client for talking to peer nodes.
pub struct PeerClient {
    http: reqwest::Client,
    /// This node's own listening port, sent as the `port` header on block
    /// spread so recipients can address us back for reverse-reconciliation.
    own_port: u16,
}

impl PeerClient {
    pub fn new(own_port: u16) -> Self {
        let http = reqwest::Client::builder()
            .timeout(PEER_TIMEOUT)
            .build()
            .expect("reqwest client builds with a static timeout");
        PeerClient { http, own_port }
    }

    /// POSTs `block` to every peer's `/chain/add`, best-effort.
    pub async fn spread_block(&self, peers: &[String], block: &Block) {
        let Ok(body) = canon(block) else {
            tracing::warn!("failed to canonicalize block for gossip");
            return;
        };
        for peer in peers {
            let url = format!("{peer}/chain/add");
            let result = self
                .http
                .post(&url)
                .header("port", self.own_port.to_string())
                .header("content-type", "application/json")
                .body(body.clone())
                .send()
                .await;
            match result {
                Ok(resp) => tracing::debug!(%peer, status = %resp.status(), "spread block"),
                Err(e) => tracing::warn!(%peer, error = %e, "failed to spread block"),
            }
        }
    }

    /// POSTs `tx` to every peer's `/transactions/add`, best-effort.
    pub async fn spread_transaction(&self, peers: &[String], tx: &Transaction) {
        let Ok(body) = canon(tx) else {
            tracing::warn!("failed to canonicalize transaction for gossip");
            return;
        };
        for peer in peers {
            let url = format!("{peer}/transactions/add");
            let result = self
                .http
                .post(&url)
                .header("content-type", "application/json")
                .body(body.clone())
                .send()
                .await;
            match result {
                Ok(resp) => tracing::debug!(%peer, status = %resp.status(), "spread transaction"),
                Err(e) => tracing::warn!(%peer, error = %e, "failed to spread transaction"),
            }
        }
    }

    /// Fetches a peer's `last_block`.
    pub async fn fetch_last_block(&self, peer: &str) -> Result<Block, PeerError> {
        let resp = self
            .http
            .get(format!("{peer}/chain/last"))
            .send()
            .await
            .map_err(PeerError::Transport)?;
        resp.json().await.map_err(PeerError::Transport)
    }

    /// Fetches a peer's full chain.
    pub async fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, PeerError> {
        let resp = self
            .http
            .get(format!("{peer}/chain"))
            .send()
            .await
            .map_err(PeerError::Transport)?;
        resp.json().await.map_err(PeerError::Transport)
    }

    /// Fetches a peer's `/nodes` list.
    pub async fn fetch_nodes(&self, peer: &str) -> Result<Vec<String>, PeerError> {
        let resp = self
            .http
            .get(format!("{peer}/nodes"))
            .send()
            .await
            .map_err(PeerError::Transport)?;
        resp.json().await.map_err(PeerError::Transport)
    }

    /// Fetches a peer's pending-transaction hash list.
    pub async fn fetch_transaction_hashes(&self, peer: &str) -> Result<Vec<String>, PeerError> {
        let resp = self
            .http
            .get(format!("{peer}/transactions/hash"))
            .send()
            .await
            .map_err(PeerError::Transport)?;
        resp.json().await.map_err(PeerError::Transport)
    }

    /// Fetches one transaction by hash from a peer.
    pub async fn fetch_transaction(&self, peer: &str, hash: &str) -> Result<Transaction, PeerError> {
        let resp = self
            .http
            .get(format!("{peer}/transaction/{hash}"))
            .send()
            .await
            .map_err(PeerError::Transport)?;
        resp.json().await.map_err(PeerError::Transport)
    }

    /// Fetches a peer's `/uid`.
    pub async fn fetch_uid(&self, peer: &str) -> Result<String, PeerError> {
        let resp = self
            .http
            .get(format!("{peer}/uid"))
            .send()
            .await
            .map_err(PeerError::Transport)?;
        resp.text().await.map_err(PeerError::Transport)
    }

    /// Probes a peer by POSTing our `last_block` to its `/chain/add`, purely
    /// as a liveness/compatibility check (mirrors `is_valid_node`).
    pub async fn probe(&self, peer: &str, last_block: &Block) -> bool {
        let Ok(body) = canon(last_block) else {
            return false;
        };
        self.http
            .post(format!("{peer}/chain/add"))
            .header("port", self.own_port.to_string())
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .is_ok()
    }
}

/// Transport-level peer communication failure.
#[derive(Debug)]
pub enum PeerError {
    Transport(reqwest::Error),
}

impl std::fmt::Display for PeerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeerError::Transport(e) => write!(f, "peer transport error: {e}"),
        }
    }
}

impl std::error::Error for PeerError {}

/// Node discovery: samples known peers without replacement, probing each and
/// merging in any newly-discovered URL whose `/uid` differs from our own,
/// until `max_nodes` is reached or every known peer has been sampled.
pub async fn discover_nodes(
    client: &PeerClient,
    known: &mut Vec<String>,
    own_uid: &str,
    last_block: &Block,
    max_nodes: usize,
) -> usize {
    let mut added = 0usize;
    let mut remaining: Vec<String> = known.clone();
    let mut rng = rand::thread_rng();
    remaining.shuffle(&mut rng);

    for candidate in remaining {
        if known.len() >= max_nodes {
            break;
        }
        if !client.probe(&candidate, last_block).await {
            continue;
        }
        let Ok(peer_nodes) = client.fetch_nodes(&candidate).await else {
            continue;
        };
        for node in peer_nodes {
            if known.contains(&node) {
                continue;
            }
            let Ok(uid) = client.fetch_uid(&node).await else {
                continue;
            };
            if uid != own_uid {
                known.push(node);
                added += 1;
            }
            if known.len() >= max_nodes {
                break;
            }
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_client_constructs_with_timeout() {
        let _client = PeerClient::new(5000);
    }
}
