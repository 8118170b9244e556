//! Chain library crate.
//!
//! This crate provides the core building blocks for a small peer-to-peer
//! proof-of-work ledger:
//!
//! - canonical encoding and hashing (`canonical`),
//! - key/address cryptography (`crypto`),
//! - strongly-typed domain types (`types`),
//! - replay and balance-state rules (`state`),
//! - proof-of-work search and block assembly (`mining`),
//! - a pending-transaction pool (`mempool`),
//! - key material and its on-disk form (`wallet`),
//! - whole-file JSON persistence (`persistence`),
//! - a peer HTTP client and node discovery (`peers`),
//! - top-level node configuration (`config`),
//! - and the engine tying all of the above together (`engine`).
//!
//! The `node` and `recon-client` binaries compose these pieces into a
//! running node and its reconciliation loop.

pub mod canonical;
pub mod config;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod mempool;
pub mod mining;
pub mod persistence;
pub mod peers;
pub mod state;
pub mod types;
pub mod wallet;

pub use canonical::{canon, canon_hash};
pub use config::ChainConfig;
pub use engine::Engine;
pub use error::{BlockError, CanonicalError, MiningError, StorageError, TxError};
pub use mempool::Mempool;
pub use peers::{discover_nodes, PeerClient, PeerError};
pub use state::{replay, update_state, valid_block, valid_txn, State};
pub use types::{Block, Transaction};
pub use wallet::Wallet;
