//! Periodic reconciliation client.
//!
//! Drives a local node's `/transactions/clean`, `/nodes/resolve`, and
//! `/transactions/resolve` endpoints against every peer the node knows
//! about, then waits for the node to report idle via `/working` before
//! looping again. Mirrors the reference reconciliation loop: clean, resolve
//! nodes, resolve transactions, sleep, poll until idle.

use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

/// Periodic reconciliation client for a local ledger node.
#[derive(Parser, Clone, Debug)]
#[command(name = "recon-client", about = "Drive a node's peer reconciliation loop")]
struct Cli {
    /// Host the target node listens on.
    #[arg(short = 'H', long = "host", default_value = "127.0.0.1")]
    host: String,

    /// Port the target node listens on.
    #[arg(short = 'p', long = "port", default_value_t = 5000)]
    port: u16,
}

#[derive(Deserialize)]
struct WorkingResponse {
    chains: bool,
    transactions: bool,
}

struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    fn new(host: &str, port: u16) -> Self {
        Client {
            http: reqwest::Client::new(),
            base_url: format!("http://{host}:{port}"),
        }
    }

    async fn clean_transactions(&self) {
        let url = format!("{}/transactions/clean", self.base_url);
        if let Err(e) = self.http.get(&url).send().await {
            tracing::warn!(error = %e, "failed to clean transactions");
        }
    }

    async fn get_nodes(&self) -> Vec<String> {
        let url = format!("{}/nodes", self.base_url);
        match self.http.get(&url).send().await {
            Ok(resp) => resp.json().await.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch node list");
                Vec::new()
            }
        }
    }

    async fn resolve_nodes_all(&self) {
        for peer in self.get_nodes().await {
            let url = format!("{}/nodes/resolve", self.base_url);
            let body = serde_json::json!({ "node": peer });
            if let Err(e) = self.http.post(&url).json(&body).send().await {
                tracing::warn!(%peer, error = %e, "failed to resolve nodes");
            }
        }
    }

    async fn resolve_transactions_all(&self) {
        for peer in self.get_nodes().await {
            let url = format!("{}/transactions/resolve", self.base_url);
            let body = serde_json::json!({ "node": peer });
            if let Err(e) = self.http.post(&url).json(&body).send().await {
                tracing::warn!(%peer, error = %e, "failed to resolve transactions");
            }
        }
    }

    async fn is_working(&self) -> bool {
        let url = format!("{}/working", self.base_url);
        match self.http.get(&url).send().await {
            Ok(resp) => match resp.json::<WorkingResponse>().await {
                Ok(w) => !(w.chains || w.transactions),
                Err(_) => true,
            },
            Err(e) => {
                tracing::warn!(error = %e, "failed to poll working status");
                true
            }
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "recon_client=info".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let client = Client::new(&cli.host, cli.port);

    tracing::info!(host = %cli.host, port = cli.port, "reconciliation client starting");

    loop {
        client.clean_transactions().await;
        client.resolve_nodes_all().await;
        client.resolve_transactions_all().await;

        tokio::time::sleep(Duration::from_secs(5)).await;

        while !client.is_working().await {
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }
}
