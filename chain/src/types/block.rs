//! Block type: structure, builder, hashing.

use serde::{Deserialize, Serialize};

use crate::canonical::canon_hash;
use crate::error::CanonicalError;
use crate::types::Transaction;

/// Nonce used by the genesis block; exempt from the proof-of-work target check.
pub const GENESIS_POW: u64 = 9;

/// Sentinel `previous_hash` for the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// An immutable, hashed unit of the chain.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Block {
    pub block_n: u64,
    pub timestamp: String,
    pub token_n: usize,
    pub tokens: Vec<Transaction>,
    pub miner: String,
    pub previous_hash: String,
    pub pow: u64,
    pub hash: String,
}

/// The subset of fields hashed over: everything except `hash`.
#[derive(Serialize)]
struct BlockPayload<'a> {
    block_n: u64,
    timestamp: &'a str,
    token_n: usize,
    tokens: &'a [Transaction],
    miner: &'a str,
    previous_hash: &'a str,
    pow: u64,
}

impl Block {
    fn payload(&self) -> BlockPayload<'_> {
        BlockPayload {
            block_n: self.block_n,
            timestamp: &self.timestamp,
            token_n: self.token_n,
            tokens: &self.tokens,
            miner: &self.miner,
            previous_hash: &self.previous_hash,
            pow: self.pow,
        }
    }

    /// Recomputes `H(B \ {hash})`.
    pub fn compute_hash(&self) -> Result<String, CanonicalError> {
        canon_hash(&self.payload())
    }

    /// Builds a block with the hash filled in last, so the returned value is
    /// always self-consistent. `pow` must already have been found by the
    /// caller (the builder does not run proof-of-work itself).
    pub fn build(
        block_n: u64,
        timestamp: String,
        tokens: Vec<Transaction>,
        miner: String,
        previous_hash: String,
        pow: u64,
    ) -> Result<Self, CanonicalError> {
        let token_n = tokens.len();
        let mut block = Block {
            block_n,
            timestamp,
            token_n,
            tokens,
            miner,
            previous_hash,
            pow,
            hash: String::new(),
        };
        block.hash = block.compute_hash()?;
        Ok(block)
    }

    pub fn is_genesis_shape(&self) -> bool {
        self.block_n == 0
            && self.tokens.len() == 1
            && self.previous_hash == GENESIS_PREVIOUS_HASH
            && self.pow == GENESIS_POW
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_keypair;

    fn reward_tx(miner: &str) -> Transaction {
        let (public, private) = generate_keypair();
        Transaction::new_reward(&public, &private, miner, 1.0, "t0".into()).unwrap()
    }

    #[test]
    fn block_hash_is_deterministic() {
        let tx = reward_tx("miner-addr");
        let b1 = Block::build(0, "t0".into(), vec![tx.clone()], "miner-addr".into(), "0".into(), 9).unwrap();
        let b2 = Block::build(0, "t0".into(), vec![tx], "miner-addr".into(), "0".into(), 9).unwrap();
        assert_eq!(b1.hash, b2.hash);
    }

    #[test]
    fn genesis_shape_check() {
        let tx = reward_tx("miner-addr");
        let genesis = Block::build(0, "t0".into(), vec![tx], "miner-addr".into(), "0".into(), 9).unwrap();
        assert!(genesis.is_genesis_shape());
    }

    #[test]
    fn tampering_with_a_field_breaks_the_hash() {
        let tx = reward_tx("miner-addr");
        let mut block = Block::build(0, "t0".into(), vec![tx], "miner-addr".into(), "0".into(), 9).unwrap();
        let original_hash = block.hash.clone();
        block.miner = "someone-else".into();
        assert_ne!(block.compute_hash().unwrap(), original_hash);
    }
}
