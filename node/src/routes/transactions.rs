//! `/transactions*` and `/transaction/<hash>` routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use chain::{Transaction, Wallet};

use crate::reconcile;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct NewTransactionRequest {
    /// Wallet file (under the wallets directory) to sign with; defaults to
    /// the node's primary wallet.
    #[serde(default)]
    pub wallet: Option<String>,
    pub recipient: String,
    pub amount: f64,
}

#[derive(Serialize)]
pub struct NewTransactionResponse {
    pub message: Option<&'static str>,
    pub error: Option<&'static str>,
}

/// `POST /transactions/new`
pub async fn new_transaction(
    State(state): State<SharedState>,
    Json(body): Json<NewTransactionRequest>,
) -> (StatusCode, Json<NewTransactionResponse>) {
    let wallets_dir = {
        let engine = state.engine.lock().await;
        engine.wallets_dir()
    };

    let wallet = match body.wallet {
        Some(name) => match Wallet::load_or_create(&wallets_dir.join(name)) {
            Ok(w) => w,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load wallet for new transaction");
                return (
                    StatusCode::CREATED,
                    Json(NewTransactionResponse {
                        message: None,
                        error: Some("could not load wallet"),
                    }),
                );
            }
        },
        None => {
            let engine = state.engine.lock().await;
            engine.wallet.clone()
        }
    };

    let timestamp = chain::engine::now_iso8601();
    let tx = match Transaction::new_signed(&wallet.public, &wallet.private, &body.recipient, body.amount, timestamp) {
        Ok(tx) => tx,
        Err(_) => {
            return (
                StatusCode::CREATED,
                Json(NewTransactionResponse {
                    message: None,
                    error: Some("could not build transaction"),
                }),
            )
        }
    };

    let mut engine = state.engine.lock().await;
    let chain_state = match engine.state_with_mempool() {
        Some(s) => s,
        None => {
            return (
                StatusCode::CREATED,
                Json(NewTransactionResponse {
                    message: None,
                    error: Some("Not enough funds"),
                }),
            )
        }
    };
    if chain::valid_txn(&chain_state, &tx).is_err() {
        return (
            StatusCode::CREATED,
            Json(NewTransactionResponse {
                message: None,
                error: Some("Not enough funds"),
            }),
        );
    }

    let added = engine.add_transaction(tx.clone()).unwrap_or(false);
    let peers = engine.nodes.clone();
    drop(engine);

    if added {
        state.peer_client.spread_transaction(&peers, &tx).await;
        (
            StatusCode::CREATED,
            Json(NewTransactionResponse {
                message: Some("Transaction will be added to Block"),
                error: None,
            }),
        )
    } else {
        (
            StatusCode::CREATED,
            Json(NewTransactionResponse {
                message: None,
                error: Some("Not enough funds, maybe some are reserved"),
            }),
        )
    }
}

/// `POST /transactions/add`
pub async fn add_transaction(
    State(state): State<SharedState>,
    Json(tx): Json<Transaction>,
) -> (StatusCode, Json<serde_json::Value>) {
    let mut engine = state.engine.lock().await;
    let Some(chain_state) = engine.state_with_mempool() else {
        return (StatusCode::UNAUTHORIZED, Json(serde_json::Value::Bool(false)));
    };
    if chain::valid_txn(&chain_state, &tx).is_err() {
        return (StatusCode::UNAUTHORIZED, Json(serde_json::Value::Bool(false)));
    }
    let added = engine.add_transaction(tx.clone()).unwrap_or(false);
    let peers = engine.nodes.clone();
    drop(engine);

    if added {
        state.peer_client.spread_transaction(&peers, &tx).await;
        (
            StatusCode::CREATED,
            Json(serde_json::Value::String(tx.hash)),
        )
    } else {
        (StatusCode::UNAUTHORIZED, Json(serde_json::Value::Bool(false)))
    }
}

/// `GET /transactions`
pub async fn list_transactions(State(state): State<SharedState>) -> Json<Vec<Transaction>> {
    let engine = state.engine.lock().await;
    Json(engine.mempool.transactions().to_vec())
}

/// `GET /transactions/hash`
pub async fn list_transaction_hashes(State(state): State<SharedState>) -> Json<Vec<String>> {
    let engine = state.engine.lock().await;
    Json(engine.mempool.hashes())
}

#[derive(Serialize)]
pub struct LengthResponse {
    pub length: usize,
}

/// `GET /transactions/length`
pub async fn transactions_length(State(state): State<SharedState>) -> Json<LengthResponse> {
    let engine = state.engine.lock().await;
    Json(LengthResponse {
        length: engine.mempool.len(),
    })
}

/// `GET /transaction/<hash>`
pub async fn get_transaction(
    State(state): State<SharedState>,
    Path(hash): Path<String>,
) -> (StatusCode, Json<serde_json::Value>) {
    let engine = state.engine.lock().await;
    if let Some(tx) = engine.mempool.transactions().iter().find(|t| t.hash == hash) {
        return (StatusCode::OK, Json(serde_json::to_value(tx).unwrap()));
    }
    for block in &engine.chain {
        if let Some(tx) = block.tokens.iter().find(|t| t.hash == hash) {
            return (StatusCode::OK, Json(serde_json::to_value(tx).unwrap()));
        }
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({"error": "transaction not found"})),
    )
}

#[derive(Deserialize)]
pub struct NodeRequest {
    pub node: String,
}

/// `POST /transactions/resolve`
pub async fn resolve_transactions(
    State(state): State<SharedState>,
    Json(body): Json<NodeRequest>,
) -> (StatusCode, String) {
    {
        let mut engine = state.engine.lock().await;
        engine.resolving_transactions = true;
    }
    let added = reconcile::resolve_transactions(&state, &body.node).await;
    {
        let mut engine = state.engine.lock().await;
        engine.resolving_transactions = false;
    }
    (StatusCode::CREATED, format!("Pulled {added} transactions"))
}

/// `GET /transactions/clean`
pub async fn clean_transactions(State(state): State<SharedState>) -> (StatusCode, String) {
    let mut engine = state.engine.lock().await;
    match engine.clean_transactions() {
        Ok(()) => (StatusCode::CREATED, "Transactions cleaned".to_string()),
        Err(e) => (StatusCode::CREATED, format!("failed to clean: {e}")),
    }
}
