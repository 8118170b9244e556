//! Unconfirmed transaction pool: dedup, batch assembly, cleaning.

use std::collections::HashSet;

use crate::state::{replay, update_state, valid_txn};
use crate::types::Block;
use crate::types::Transaction;

/// Ordered collection of unconfirmed transactions, deduplicated by hash
/// against both itself and the confirmed chain.
#[derive(Default)]
pub struct Mempool {
    transactions: Vec<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn hashes(&self) -> Vec<String> {
        self.transactions.iter().map(|t| t.hash.clone()).collect()
    }

    /// Rejects `tx` if its hash is already present in the mempool or the
    /// confirmed chain; otherwise appends it. Returns whether it was added.
    pub fn add(&mut self, tx: Transaction, chain: &[Block]) -> bool {
        let local_hashes: HashSet<&str> = self.transactions.iter().map(|t| t.hash.as_str()).collect();
        if local_hashes.contains(tx.hash.as_str()) || hashes_in_chain(chain).contains(&tx.hash) {
            return false;
        }
        self.transactions.push(tx);
        true
    }

    /// Returns up to `n` transactions in insertion order and removes them.
    pub fn take_batch(&mut self, n: usize) -> Vec<Transaction> {
        let take = n.min(self.transactions.len());
        self.transactions.drain(0..take).collect()
    }

    /// Returns a batch sized per the mining-loop contract: the first
    /// `block_size` transactions if at least that many are pending,
    /// otherwise all of them. `block_size` is normally
    /// [`crate::config::ConsensusConfig::block_size`].
    pub fn take_mining_batch(&mut self, block_size: usize) -> Vec<Transaction> {
        if self.transactions.len() >= block_size {
            self.take_batch(block_size)
        } else {
            std::mem::take(&mut self.transactions)
        }
    }

    /// Returns unmined transactions to the front of the pool, e.g. after a
    /// failed mining attempt.
    pub fn return_batch(&mut self, mut batch: Vec<Transaction>) {
        batch.extend(std::mem::take(&mut self.transactions));
        self.transactions = batch;
    }

    /// Recomputes chain state via [`replay`] and drops any pending
    /// transaction that is now confirmed or no longer valid against that
    /// state; surviving transactions incrementally extend the state in
    /// order, matching the reference semantics.
    pub fn clean(&mut self, chain: &[Block], pow_leading_zeros: usize) {
        let confirmed = hashes_in_chain(chain);
        let mut state = replay(chain, pow_leading_zeros).unwrap_or_default();
        let mut survivors = Vec::with_capacity(self.transactions.len());
        for tx in std::mem::take(&mut self.transactions) {
            if confirmed.contains(&tx.hash) {
                continue;
            }
            if valid_txn(&state, &tx).is_ok() {
                update_state(&mut state, std::slice::from_ref(&tx));
                survivors.push(tx);
            }
        }
        self.transactions = survivors;
    }
}

/// The set of all transaction hashes present in any confirmed block.
pub fn hashes_in_chain(chain: &[Block]) -> HashSet<String> {
    chain
        .iter()
        .flat_map(|b| b.tokens.iter())
        .map(|t| t.hash.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_keypair;

    fn sample_tx() -> Transaction {
        let (public, private) = generate_keypair();
        Transaction::new_signed(&public, &private, "recipient", 0.1, "t".into()).unwrap()
    }

    #[test]
    fn add_rejects_duplicate_hash() {
        let mut pool = Mempool::new();
        let tx = sample_tx();
        assert!(pool.add(tx.clone(), &[]));
        assert!(!pool.add(tx, &[]));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn take_mining_batch_takes_all_when_below_block_size() {
        let mut pool = Mempool::new();
        pool.add(sample_tx(), &[]);
        pool.add(sample_tx(), &[]);
        let batch = pool.take_mining_batch(10);
        assert_eq!(batch.len(), 2);
        assert!(pool.is_empty());
    }

    #[test]
    fn return_batch_restores_pending_transactions() {
        let mut pool = Mempool::new();
        pool.add(sample_tx(), &[]);
        let batch = pool.take_mining_batch(10);
        assert!(pool.is_empty());
        pool.return_batch(batch);
        assert_eq!(pool.len(), 1);
    }
}
