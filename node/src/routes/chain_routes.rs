//! `/chain*` routes.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;

use chain::Block;

use crate::reconcile;
use crate::state::SharedState;

/// `GET /chain`
pub async fn get_chain(State(state): State<SharedState>) -> Json<Vec<Block>> {
    let engine = state.engine.lock().await;
    Json(engine.chain.clone())
}

#[derive(Serialize)]
pub struct LengthResponse {
    pub length: usize,
}

/// `GET /chain/length`
pub async fn chain_length(State(state): State<SharedState>) -> Json<LengthResponse> {
    let engine = state.engine.lock().await;
    Json(LengthResponse {
        length: engine.chain.len(),
    })
}

/// `GET /chain/last`
pub async fn chain_last(State(state): State<SharedState>) -> Json<Block> {
    let engine = state.engine.lock().await;
    Json(engine.last_block().clone())
}

/// `POST /chain/add`
///
/// If the block validly extends our tip, appends and gossips onward.
/// Otherwise, if a `port` header is present, runs chain resolution against
/// the sender; if that does not update us, pushes our own tip back.
pub async fn add_block(
    State(state): State<SharedState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(block): Json<Block>,
) -> (StatusCode, String) {
    let accepted = {
        let mut engine = state.engine.lock().await;
        engine.append_block(block.clone()).unwrap_or(false)
    };

    if accepted {
        let (peers, own_last) = {
            let engine = state.engine.lock().await;
            (engine.nodes.clone(), engine.last_block().clone())
        };
        state.peer_client.spread_block(&peers, &own_last).await;
        return (StatusCode::CREATED, block.hash);
    }

    let port = headers
        .get("port")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u16>().ok());

    let Some(port) = port else {
        return (StatusCode::UNAUTHORIZED, "Chain not updated".to_string());
    };

    let sender_url = format!("http://{}:{port}", remote.ip());
    let updated = reconcile::resolve_chain(&state, &sender_url).await;

    if updated {
        (StatusCode::CREATED, "Chain updated".to_string())
    } else {
        let own_last = {
            let engine = state.engine.lock().await;
            engine.last_block().clone()
        };
        state.peer_client.spread_block(&[sender_url], &own_last).await;
        (StatusCode::UNAUTHORIZED, "Chain not updated".to_string())
    }
}
