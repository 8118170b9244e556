//! Top-level configuration for a chain node.
//!
//! Aggregates the tunables a node needs: where its JSON data files live,
//! the mining/mempool constants, and peer-discovery bounds. Binaries
//! construct this from defaults and override with CLI flags as needed.

use std::path::PathBuf;

use crate::mining::{BLOCK_SIZE, POW_LEADING_ZEROS, REWARD_AMOUNT};

/// Default bound on the number of known peers (`MAX_NODES` in the spec).
pub const MAX_NODES: usize = 8;

/// Storage configuration: where the node's JSON files live on disk.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub wallets_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            wallets_dir: PathBuf::from("wallets"),
        }
    }
}

/// Mining and mempool tunables.
#[derive(Clone, Debug)]
pub struct ConsensusConfig {
    pub block_size: usize,
    pub pow_leading_zeros: usize,
    pub reward_amount: f64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            block_size: BLOCK_SIZE,
            pow_leading_zeros: POW_LEADING_ZEROS,
            reward_amount: REWARD_AMOUNT,
        }
    }
}

/// Peer-discovery and gossip tunables.
#[derive(Clone, Debug)]
pub struct PeerConfig {
    pub max_nodes: usize,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            max_nodes: MAX_NODES,
        }
    }
}

/// Top-level configuration for a chain node.
#[derive(Clone, Debug, Default)]
pub struct ChainConfig {
    pub consensus: ConsensusConfig,
    pub storage: StorageConfig,
    pub peers: PeerConfig,
}
