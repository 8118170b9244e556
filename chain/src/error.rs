//! Error types for the chain crate.
//!
//! Mirrors the teacher's hand-rolled style: plain enums with manual
//! `Display` and `std::error::Error` impls, no `thiserror`.

use std::fmt;

/// Failure to produce a canonical encoding of a value.
#[derive(Debug)]
pub enum CanonicalError {
    Encode(serde_json::Error),
}

impl fmt::Display for CanonicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalError::Encode(e) => write!(f, "failed to encode canonical value: {e}"),
        }
    }
}

impl std::error::Error for CanonicalError {}

/// Transaction-level validation failure.
#[derive(Debug)]
pub enum TxError {
    HashMismatch,
    BadSignature,
    InsufficientFunds,
    Canonical(CanonicalError),
}

impl fmt::Display for TxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxError::HashMismatch => write!(f, "transaction hash does not match its contents"),
            TxError::BadSignature => write!(f, "transaction signature does not verify"),
            TxError::InsufficientFunds => write!(f, "Not enough funds"),
            TxError::Canonical(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for TxError {}

impl From<CanonicalError> for TxError {
    fn from(e: CanonicalError) -> Self {
        TxError::Canonical(e)
    }
}

/// Block-level validation failure.
#[derive(Debug)]
pub enum BlockError {
    HashMismatch,
    ParentHashMismatch,
    PreviousHashMismatch,
    HeightMismatch,
    InvalidProofOfWork,
    InvalidTransaction(TxError),
    Canonical(CanonicalError),
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockError::HashMismatch => write!(f, "block hash does not match its contents"),
            BlockError::ParentHashMismatch => write!(f, "parent block hash does not self-verify"),
            BlockError::PreviousHashMismatch => {
                write!(f, "previous_hash does not match the parent's hash")
            }
            BlockError::HeightMismatch => write!(f, "block_n is not parent.block_n + 1"),
            BlockError::InvalidProofOfWork => write!(f, "proof-of-work does not verify"),
            BlockError::InvalidTransaction(e) => write!(f, "invalid transaction in block: {e}"),
            BlockError::Canonical(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BlockError {}

impl From<CanonicalError> for BlockError {
    fn from(e: CanonicalError) -> Self {
        BlockError::Canonical(e)
    }
}

impl From<TxError> for BlockError {
    fn from(e: TxError) -> Self {
        BlockError::InvalidTransaction(e)
    }
}

/// Mining attempt failure.
#[derive(Debug)]
pub enum MiningError {
    AlreadyMining,
    InvalidCandidate(BlockError),
}

impl fmt::Display for MiningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiningError::AlreadyMining => write!(f, "a mining attempt is already in progress"),
            MiningError::InvalidCandidate(e) => write!(f, "mined candidate block is invalid: {e}"),
        }
    }
}

impl std::error::Error for MiningError {}

/// Persistence-layer failure.
#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Serde(serde_json::Error),
    Genesis(BlockError),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "storage I/O error: {e}"),
            StorageError::Serde(e) => write!(f, "storage serialization error: {e}"),
            StorageError::Genesis(e) => write!(f, "failed to build genesis block: {e}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serde(e)
    }
}

impl From<BlockError> for StorageError {
    fn from(e: BlockError) -> Self {
        StorageError::Genesis(e)
    }
}
