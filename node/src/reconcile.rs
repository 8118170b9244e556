//! Chain and transaction reconciliation against a single peer.
//!
//! Mirrors `resolve_chain`/`resolve_transactions` from the reference node:
//! peer HTTP calls happen with the engine lock released, and the engine is
//! only reacquired to validate-and-commit the result.

use crate::state::SharedState;

/// Runs §4.10 chain resolution against `peer`. Returns whether the local
/// chain was replaced.
pub async fn resolve_chain(state: &SharedState, peer: &str) -> bool {
    let Ok(peer_last) = state.peer_client.fetch_last_block(peer).await else {
        tracing::warn!(%peer, "chain resolution: could not fetch peer last_block");
        return false;
    };
    if peer_last.compute_hash().ok().as_deref() != Some(peer_last.hash.as_str()) {
        tracing::warn!(%peer, "chain resolution: peer last_block does not self-verify");
        return false;
    }

    let (our_last_hash, our_block_n, our_chain_valid) = {
        let engine = state.engine.lock().await;
        let last = engine.last_block();
        (
            last.hash.clone(),
            last.block_n,
            engine.state().is_some(),
        )
    };

    if peer_last.hash == our_last_hash {
        return false;
    }
    if peer_last.block_n <= our_block_n && our_chain_valid {
        return false;
    }

    let Ok(peer_chain) = state.peer_client.fetch_chain(peer).await else {
        tracing::warn!(%peer, "chain resolution: could not fetch peer chain");
        return false;
    };

    let mut engine = state.engine.lock().await;
    match engine.replace_chain(peer_chain) {
        Ok(true) => {
            tracing::info!(%peer, "chain resolution: replaced local chain");
            true
        }
        Ok(false) => {
            tracing::debug!(%peer, "chain resolution: peer chain did not replay to a valid state");
            false
        }
        Err(e) => {
            tracing::warn!(%peer, error = %e, "chain resolution: failed to persist replaced chain");
            false
        }
    }
}

/// Runs §4.9's "missing transaction" half of reconciliation against `peer`:
/// diff pending-hash lists, pull any transaction we don't have, and add it.
pub async fn resolve_transactions(state: &SharedState, peer: &str) -> usize {
    let Ok(peer_hashes) = state.peer_client.fetch_transaction_hashes(peer).await else {
        tracing::warn!(%peer, "transaction resolution: could not fetch peer hashes");
        return 0;
    };

    let local_hashes: std::collections::HashSet<String> = {
        let engine = state.engine.lock().await;
        engine.mempool.hashes().into_iter().collect()
    };

    let missing: Vec<String> = peer_hashes
        .into_iter()
        .filter(|h| !local_hashes.contains(h))
        .collect();

    let mut added = 0;
    for hash in missing {
        let Ok(tx) = state.peer_client.fetch_transaction(peer, &hash).await else {
            continue;
        };
        let mut engine = state.engine.lock().await;
        let Some(chain_state) = engine.state() else {
            continue;
        };
        if chain::valid_txn(&chain_state, &tx).is_ok() && engine.add_transaction(tx).unwrap_or(false)
        {
            added += 1;
        }
    }
    added
}
