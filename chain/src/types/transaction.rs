//! Transaction type: structure, hashing, signing.

use serde::{Deserialize, Serialize};

use crate::canonical::{canon, canon_hash};
use crate::crypto;
use crate::error::{CanonicalError, TxError};

/// The sentinel sender address marking a miner-reward transaction.
pub const REWARD_SENDER: &str = "0";

/// A transfer of value from `sender` to `recipient`, or a reward minted to
/// `recipient` when `sender == "0"`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    pub timestamp: String,
    pub public_key: String,
    pub hash: String,
    pub signature: String,
}

/// The subset of fields that are hashed/signed over — everything except
/// `hash` and `signature`.
#[derive(Serialize)]
struct TxPayload<'a> {
    sender: &'a str,
    recipient: &'a str,
    amount: f64,
    timestamp: &'a str,
    public_key: &'a str,
}

/// The subset of fields included in the signed message: everything except
/// `signature` (i.e. `hash` is part of what gets signed).
#[derive(Serialize)]
struct TxSignedPayload<'a> {
    sender: &'a str,
    recipient: &'a str,
    amount: f64,
    timestamp: &'a str,
    public_key: &'a str,
    hash: &'a str,
}

impl Transaction {
    fn payload(&self) -> TxPayload<'_> {
        TxPayload {
            sender: &self.sender,
            recipient: &self.recipient,
            amount: self.amount,
            timestamp: &self.timestamp,
            public_key: &self.public_key,
        }
    }

    fn signed_payload(&self) -> TxSignedPayload<'_> {
        TxSignedPayload {
            sender: &self.sender,
            recipient: &self.recipient,
            amount: self.amount,
            timestamp: &self.timestamp,
            public_key: &self.public_key,
            hash: &self.hash,
        }
    }

    /// Recomputes `H(T \ {hash, signature})`.
    pub fn compute_hash(&self) -> Result<String, CanonicalError> {
        canon_hash(&self.payload())
    }

    /// Builds, hashes, and signs a transfer transaction from a wallet's keys.
    pub fn new_signed(
        public_key_hex: &str,
        private_key_hex: &str,
        recipient: &str,
        amount: f64,
        timestamp: String,
    ) -> Result<Self, TxError> {
        let public_bytes = hex::decode(public_key_hex).map_err(|_| TxError::BadSignature)?;
        let mut tx = Transaction {
            sender: crypto::address_from_public_key(&public_bytes),
            recipient: recipient.to_string(),
            amount: amount.abs(),
            timestamp,
            public_key: public_key_hex.to_string(),
            hash: String::new(),
            signature: String::new(),
        };
        tx.hash = tx.compute_hash()?;
        let message = canon(&tx.signed_payload())?;
        tx.signature = crypto::sign(private_key_hex, &message).map_err(|_| TxError::BadSignature)?;
        Ok(tx)
    }

    /// Builds, hashes, and signs a reward transaction crediting `miner_address`.
    pub fn new_reward(
        public_key_hex: &str,
        private_key_hex: &str,
        miner_address: &str,
        reward_amount: f64,
        timestamp: String,
    ) -> Result<Self, TxError> {
        let mut tx = Transaction {
            sender: REWARD_SENDER.to_string(),
            recipient: miner_address.to_string(),
            amount: reward_amount,
            timestamp,
            public_key: public_key_hex.to_string(),
            hash: String::new(),
            signature: String::new(),
        };
        tx.hash = tx.compute_hash()?;
        let message = canon(&tx.signed_payload())?;
        tx.signature = crypto::sign(private_key_hex, &message).map_err(|_| TxError::BadSignature)?;
        Ok(tx)
    }

    /// Structural + cryptographic validity, independent of balance. Balance
    /// checking (`state.get(sender) >= amount`) is layered on top by
    /// [`crate::state::valid_txn`].
    pub fn self_consistent(&self) -> Result<(), TxError> {
        let expected = self.compute_hash()?;
        if self.hash != expected {
            return Err(TxError::HashMismatch);
        }
        if self.sender == REWARD_SENDER {
            return Ok(());
        }
        let address = crypto::address_from_public_key(
            &hex::decode(&self.public_key).map_err(|_| TxError::BadSignature)?,
        );
        if address != self.sender {
            return Err(TxError::BadSignature);
        }
        let message = canon(&self.signed_payload())?;
        if !crypto::verify(&self.public_key, &self.signature, &message) {
            return Err(TxError::BadSignature);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_keypair;

    #[test]
    fn reward_transaction_is_self_consistent() {
        let (public, private) = generate_keypair();
        let tx = Transaction::new_reward(&public, &private, "minerAddr", 1.0, "t0".into()).unwrap();
        assert!(tx.self_consistent().is_ok());
        assert_eq!(tx.sender, REWARD_SENDER);
    }

    #[test]
    fn transfer_transaction_is_self_consistent() {
        let (public, private) = generate_keypair();
        let tx = Transaction::new_signed(&public, &private, "someRecipient", 0.3, "t1".into()).unwrap();
        assert!(tx.self_consistent().is_ok());
    }

    #[test]
    fn tampered_amount_breaks_hash_check() {
        let (public, private) = generate_keypair();
        let mut tx = Transaction::new_signed(&public, &private, "someRecipient", 0.3, "t1".into()).unwrap();
        tx.amount = 999.0;
        assert!(matches!(tx.self_consistent(), Err(TxError::HashMismatch)));
    }

    #[test]
    fn negative_amounts_are_normalised_to_absolute_value() {
        let (public, private) = generate_keypair();
        let tx = Transaction::new_signed(&public, &private, "someRecipient", -5.0, "t1".into()).unwrap();
        assert_eq!(tx.amount, 5.0);
    }
}
