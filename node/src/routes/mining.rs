//! `GET /mine`

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::SharedState;

#[derive(Serialize)]
pub struct MineResponse {
    pub message: &'static str,
    pub error: Option<&'static str>,
    pub data: Option<chain::Block>,
}

/// Mines the next block: acquires the mining flag, releases the engine lock
/// for the proof-of-work search, then reacquires it to validate, append, and
/// gossip the result.
pub async fn mine(State(state): State<SharedState>) -> (StatusCode, Json<MineResponse>) {
    let snapshot = {
        let mut engine = state.engine.lock().await;
        match engine.mining.try_acquire() {
            Ok(guard) => std::mem::forget(guard),
            Err(_) => {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(MineResponse {
                        message: "",
                        error: Some("already mining"),
                        data: None,
                    }),
                )
            }
        }
        let parent = engine.last_block().clone();
        let running_state = engine.state().unwrap_or_default();
        let batch = engine.mempool.take_mining_batch(engine.config.consensus.block_size);
        (
            parent,
            running_state,
            batch,
            engine.wallet.public.clone(),
            engine.wallet.private.clone(),
            engine.wallet.address.clone(),
            engine.config.consensus.pow_leading_zeros,
        )
    };
    let (parent, running_state, batch, public, private, address, pow_leading_zeros) = snapshot;
    let timestamp = chain::engine::now_iso8601();

    let mined = chain::mining::create_next_block(
        &parent,
        &running_state,
        batch.clone(),
        &public,
        &private,
        &address,
        timestamp,
        pow_leading_zeros,
    );

    let mut engine = state.engine.lock().await;
    engine.mining.force_release();

    let block = match mined {
        Ok(block) => block,
        Err(e) => {
            engine.mempool.return_batch(batch);
            tracing::warn!(error = %e, "mining failed to assemble a valid block");
            return (
                StatusCode::UNAUTHORIZED,
                Json(MineResponse {
                    message: "",
                    error: Some("mining failed"),
                    data: None,
                }),
            );
        }
    };

    match engine.append_block(block.clone()) {
        Ok(true) => {
            let peers = engine.nodes.clone();
            drop(engine);
            state.peer_client.spread_block(&peers, &block).await;
            (
                StatusCode::CREATED,
                Json(MineResponse {
                    message: "New Block Forged",
                    error: None,
                    data: Some(block),
                }),
            )
        }
        Ok(false) => {
            engine.mempool.return_batch(batch);
            (
                StatusCode::UNAUTHORIZED,
                Json(MineResponse {
                    message: "",
                    error: Some("mined block was not accepted as the new tip"),
                    data: None,
                }),
            )
        }
        Err(e) => {
            engine.mempool.return_batch(batch);
            tracing::error!(error = %e, "failed to persist mined block");
            (
                StatusCode::UNAUTHORIZED,
                Json(MineResponse {
                    message: "",
                    error: Some("failed to persist mined block"),
                    data: None,
                }),
            )
        }
    }
}
