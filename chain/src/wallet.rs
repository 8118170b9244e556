//! Wallet: key material plus the derived address, and its on-disk form.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::{address_from_public_key, generate_keypair};
use crate::error::StorageError;

/// A wallet's persisted shape: `{address, public, private}`, hex-encoded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Wallet {
    pub address: String,
    pub public: String,
    pub private: String,
}

impl Wallet {
    /// Generates a fresh keypair and derives its address.
    pub fn generate() -> Self {
        let (public, private) = generate_keypair();
        let address = address_from_public_key(&hex::decode(&public).expect("hex-encoded key"));
        Wallet {
            address,
            public,
            private,
        }
    }

    /// Loads a wallet from `path`, creating and persisting a fresh one if the
    /// file is absent or unreadable.
    pub fn load_or_create(path: &Path) -> Result<Self, StorageError> {
        if let Ok(text) = std::fs::read_to_string(path) {
            if let Ok(wallet) = serde_json::from_str::<Wallet>(&text) {
                return Ok(wallet);
            }
            tracing::warn!(path = %path.display(), "wallet file corrupted, generating a new one");
        }
        let wallet = Wallet::generate();
        wallet.save(path)?;
        Ok(wallet)
    }

    /// Writes the wallet to `path` as sorted-key JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let value = serde_json::to_value(self)?;
        std::fs::write(path, serde_json::to_vec(&value)?)?;
        Ok(())
    }

    /// Picks the next free `wallet-<n>.dat` path in `wallets_dir`.
    pub fn next_auxiliary_path(wallets_dir: &Path) -> PathBuf {
        let mut n = 1;
        loop {
            let candidate = wallets_dir.join(format!("wallet-{n}.dat"));
            if !candidate.exists() {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn generated_wallet_address_matches_derivation() {
        let wallet = Wallet::generate();
        let expected = address_from_public_key(&hex::decode(&wallet.public).unwrap());
        assert_eq!(wallet.address, expected);
    }

    #[test]
    fn load_or_create_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallet.dat");
        let first = Wallet::load_or_create(&path).unwrap();
        let second = Wallet::load_or_create(&path).unwrap();
        assert_eq!(first.address, second.address);
        assert_eq!(first.public, second.public);
    }

    #[test]
    fn next_auxiliary_path_skips_existing_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("wallet-1.dat"), "{}").unwrap();
        let next = Wallet::next_auxiliary_path(dir.path());
        assert_eq!(next, dir.path().join("wallet-2.dat"));
    }
}
