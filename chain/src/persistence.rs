//! Whole-file JSON persistence for chain, mempool, and peer list.
//!
//! Every write replaces the target file in full (no partial updates, no
//! append) and is expected to run under the engine's single lock (§5);
//! this module itself does no locking.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::StorageError;
use crate::types::Block;

/// Paths to the three JSON files a node persists, rooted at a data directory.
#[derive(Clone, Debug)]
pub struct PersistencePaths {
    pub chain: PathBuf,
    pub transactions: PathBuf,
    pub nodes: PathBuf,
}

impl PersistencePaths {
    pub fn under(data_dir: &Path) -> Self {
        PersistencePaths {
            chain: data_dir.join("chain.json"),
            transactions: data_dir.join("unconfirmed_transactions.json"),
            nodes: data_dir.join("nodes.json"),
        }
    }
}

fn load_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StorageError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let as_value = serde_json::to_value(value)?;
    std::fs::write(path, serde_json::to_vec(&as_value)?)?;
    Ok(())
}

pub fn load_chain(path: &Path) -> Result<Vec<Block>, StorageError> {
    load_json(path)
}

pub fn save_chain(path: &Path, chain: &[Block]) -> Result<(), StorageError> {
    save_json(path, &chain)
}

pub fn load_transactions(path: &Path) -> Result<Vec<crate::types::Transaction>, StorageError> {
    load_json(path)
}

pub fn save_transactions(
    path: &Path,
    transactions: &[crate::types::Transaction],
) -> Result<(), StorageError> {
    save_json(path, &transactions)
}

pub fn load_nodes(path: &Path) -> Result<Vec<String>, StorageError> {
    load_json(path)
}

pub fn save_nodes(path: &Path, nodes: &[String]) -> Result<(), StorageError> {
    save_json(path, &nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_keypair;
    use crate::types::Transaction;
    use tempfile::TempDir;

    #[test]
    fn chain_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chain.json");

        let (public, private) = generate_keypair();
        let reward = Transaction::new_reward(&public, &private, "addr", 1.0, "t0".into()).unwrap();
        let genesis = Block::build(0, "t0".into(), vec![reward], "addr".into(), "0".into(), 9).unwrap();

        save_chain(&path, &[genesis.clone()]).unwrap();
        let loaded = load_chain(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].hash, genesis.hash);
    }

    #[test]
    fn missing_file_loads_as_empty_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nodes.json");
        let nodes = load_nodes(&path).unwrap();
        assert!(nodes.is_empty());
    }
}
