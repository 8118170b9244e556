//! Ledger node binary.
//!
//! Exposes the HTTP surface described by the external interface table: block
//! submission and mining, transaction submission and pooling, peer
//! gossip/discovery, and chain/state queries. All mutable state lives in a
//! single `chain::Engine` behind one `tokio::sync::Mutex`; proof-of-work and
//! peer HTTP calls run with that lock released.

mod config;
mod reconcile;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use rand::RngCore;

use chain::{ChainConfig, Engine, PeerClient};
use config::Cli;
use routes::{chain_routes, mining, misc, nodes, transactions};
use state::{AppState, SharedState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "node=info,chain=info".to_string()))
        .init();

    if let Err(e) = run().await {
        eprintln!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();

    let mut config = ChainConfig::default();
    config.storage.data_dir = cli.data_dir.clone();
    config.storage.wallets_dir = cli.wallets_dir.clone();

    let node_uid = load_or_create_uid(&cli.data_dir)?;

    let engine = Engine::load(config, node_uid, cli.port)
        .map_err(|e| format!("failed to load engine state: {e}"))?;

    tracing::info!(port = cli.port, address = %engine.wallet.address, "node starting");

    let peer_client = PeerClient::new(cli.port);

    let app_state: SharedState = Arc::new(AppState {
        engine: tokio::sync::Mutex::new(engine),
        peer_client,
    });

    let app = Router::new()
        .route("/mine", get(mining::mine))
        .route("/transactions/new", post(transactions::new_transaction))
        .route("/transactions/add", post(transactions::add_transaction))
        .route("/transactions", get(transactions::list_transactions))
        .route("/transactions/hash", get(transactions::list_transaction_hashes))
        .route("/transactions/length", get(transactions::transactions_length))
        .route("/transaction/{hash}", get(transactions::get_transaction))
        .route("/transactions/resolve", post(transactions::resolve_transactions))
        .route("/transactions/clean", get(transactions::clean_transactions))
        .route("/nodes", get(nodes::list_nodes))
        .route("/nodes/resolve", post(nodes::resolve_nodes))
        .route("/nodes/add", post(nodes::add_node))
        .route("/nodes/discover", get(nodes::discover_nodes))
        .route("/chain", get(chain_routes::get_chain))
        .route("/chain/add", post(chain_routes::add_block))
        .route("/chain/length", get(chain_routes::chain_length))
        .route("/chain/last", get(chain_routes::chain_last))
        .route("/state", get(misc::state))
        .route("/state/all", get(misc::state_all))
        .route("/uid", get(misc::uid))
        .route("/working", get(misc::working))
        .with_state(app_state);

    let addr: SocketAddr = format!("0.0.0.0:{}", cli.port)
        .parse()
        .map_err(|e| format!("invalid listen address: {e}"))?;

    tracing::info!("listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("failed to bind {addr}: {e}"))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| format!("server error: {e}"))?;

    Ok(())
}

/// Loads this node's persisted identifier, or generates and persists a fresh
/// random one. Used purely for peer self-exclusion during discovery (§4.11).
fn load_or_create_uid(data_dir: &std::path::Path) -> Result<String, String> {
    let path = data_dir.join("uid.txt");
    if let Ok(existing) = std::fs::read_to_string(&path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    let uid = hex::encode(bytes);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| format!("failed to create data dir: {e}"))?;
    }
    std::fs::write(&path, &uid).map_err(|e| format!("failed to persist node uid: {e}"))?;
    Ok(uid)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
