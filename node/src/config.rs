//! Node CLI configuration.

use clap::Parser;

/// A peer-to-peer proof-of-work ledger node.
#[derive(Parser, Clone, Debug)]
#[command(name = "node", about = "Run a ledger node")]
pub struct Cli {
    /// Port to listen on.
    #[arg(short = 'p', long = "port", default_value_t = 5000)]
    pub port: u16,

    /// Directory for persisted chain/mempool/node-list JSON files.
    #[arg(long = "data-dir", default_value = ".")]
    pub data_dir: std::path::PathBuf,

    /// Directory for wallet files.
    #[arg(long = "wallets-dir", default_value = "wallets")]
    pub wallets_dir: std::path::PathBuf,
}
