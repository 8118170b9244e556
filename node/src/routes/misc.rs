//! `/state*`, `/uid`, and `/working` routes.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::SharedState;

/// `GET /state`
pub async fn state(State(state): State<SharedState>) -> Json<serde_json::Value> {
    let engine = state.engine.lock().await;
    match engine.state() {
        Some(balances) => Json(serde_json::to_value(balances).unwrap()),
        None => Json(serde_json::Value::Bool(false)),
    }
}

/// `GET /state/all`
pub async fn state_all(State(state): State<SharedState>) -> Json<serde_json::Value> {
    let engine = state.engine.lock().await;
    match engine.state_with_mempool() {
        Some(balances) => Json(serde_json::to_value(balances).unwrap()),
        None => Json(serde_json::Value::Bool(false)),
    }
}

/// `GET /uid`
pub async fn uid(State(state): State<SharedState>) -> String {
    let engine = state.engine.lock().await;
    engine.node_uid.clone()
}

#[derive(Serialize)]
pub struct WorkingResponse {
    pub chains: bool,
    pub transactions: bool,
}

/// `GET /working` — advisory resolution-in-progress flags, polled by the
/// reconciliation client until both are false.
pub async fn working(State(state): State<SharedState>) -> Json<WorkingResponse> {
    let engine = state.engine.lock().await;
    Json(WorkingResponse {
        chains: engine.resolving_chains,
        transactions: engine.resolving_transactions,
    })
}
