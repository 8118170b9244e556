//! `/nodes*` routes.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};

use crate::reconcile;
use crate::routes::transactions::NodeRequest;
use crate::state::SharedState;

/// `GET /nodes`
pub async fn list_nodes(State(state): State<SharedState>) -> Json<Vec<String>> {
    let engine = state.engine.lock().await;
    Json(engine.nodes.clone())
}

/// `POST /nodes/resolve`
pub async fn resolve_nodes(
    State(state): State<SharedState>,
    Json(body): Json<NodeRequest>,
) -> (StatusCode, String) {
    {
        let mut engine = state.engine.lock().await;
        engine.resolving_chains = true;
    }
    let replaced = reconcile::resolve_chain(&state, &body.node).await;
    {
        let mut engine = state.engine.lock().await;
        engine.resolving_chains = false;
    }
    if replaced {
        (StatusCode::CREATED, "Chain updated".to_string())
    } else {
        (StatusCode::CREATED, "Chain not updated".to_string())
    }
}

/// `POST /nodes/add` — raw URL body.
pub async fn add_node(State(state): State<SharedState>, body: Bytes) -> (StatusCode, Json<bool>) {
    let Ok(url) = String::from_utf8(body.to_vec()) else {
        return (StatusCode::UNAUTHORIZED, Json(false));
    };
    let url = url.trim().to_string();
    if url.is_empty() {
        return (StatusCode::UNAUTHORIZED, Json(false));
    }
    let mut engine = state.engine.lock().await;
    match engine.add_node(url) {
        Ok(added) => (StatusCode::OK, Json(added)),
        Err(e) => {
            tracing::warn!(error = %e, "failed to persist added node");
            (StatusCode::UNAUTHORIZED, Json(false))
        }
    }
}

/// `GET /nodes/discover`
pub async fn discover_nodes(State(state): State<SharedState>) -> (StatusCode, String) {
    let (mut known, own_uid, last_block, max_nodes) = {
        let engine = state.engine.lock().await;
        (
            engine.nodes.clone(),
            engine.node_uid.clone(),
            engine.last_block().clone(),
            engine.config.peers.max_nodes,
        )
    };

    let added = chain::discover_nodes(
        &state.peer_client,
        &mut known,
        &own_uid,
        &last_block,
        max_nodes,
    )
    .await;

    if added > 0 {
        let mut engine = state.engine.lock().await;
        for node in known {
            let _ = engine.add_node(node);
        }
    }

    (StatusCode::CREATED, format!("Discovered {added} new nodes"))
}
