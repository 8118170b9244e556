//! Pure cryptographic primitives: hashing, address derivation, ECDSA sign/verify.
//!
//! Every function here is stateless and takes/returns plain bytes or hex
//! strings so that callers never have to reach past this module for a
//! crypto primitive.

use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hex-encoded SHA-256 digest of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Derives a base58 address from an uncompressed ECDSA public key, following
/// the Bitcoin-style scheme: `base58(0x00 || ripemd160(sha256(0x04 || pub)) ||
/// sha256(sha256(...))[:4])`.
///
/// The `0x04` prefix is always prepended, matching the always-true comparison
/// in the reference implementation this protocol is wire-compatible with.
pub fn address_from_public_key(public_key: &[u8]) -> String {
    let mut prefixed = Vec::with_capacity(public_key.len() + 1);
    prefixed.push(0x04u8);
    prefixed.extend_from_slice(public_key);

    let s1 = sha256(&prefixed);
    let mut versioned = Vec::with_capacity(21);
    versioned.push(0x00u8);
    versioned.extend_from_slice(&ripemd160(&s1));

    let checksum = sha256(&sha256(&versioned));
    versioned.extend_from_slice(&checksum[..4]);

    bs58::encode(versioned).into_string()
}

/// Errors from ECDSA key handling and signature verification.
#[derive(Debug)]
pub enum CryptoError {
    InvalidHex,
    InvalidKey,
    InvalidSignature,
}

impl std::fmt::Display for CryptoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CryptoError::InvalidHex => write!(f, "invalid hex encoding"),
            CryptoError::InvalidKey => write!(f, "invalid key bytes"),
            CryptoError::InvalidSignature => write!(f, "invalid signature bytes"),
        }
    }
}

impl std::error::Error for CryptoError {}

/// Signs `message` with a hex-encoded private key, returning a hex-encoded
/// signature.
pub fn sign(private_key_hex: &str, message: &[u8]) -> Result<String, CryptoError> {
    let key_bytes = hex::decode(private_key_hex).map_err(|_| CryptoError::InvalidHex)?;
    let signing_key = SigningKey::from_slice(&key_bytes).map_err(|_| CryptoError::InvalidKey)?;
    let signature: Signature = signing_key.sign(message);
    Ok(hex::encode(signature.to_bytes()))
}

/// Verifies a hex-encoded signature over `message` with a hex-encoded public key.
pub fn verify(public_key_hex: &str, signature_hex: &str, message: &[u8]) -> bool {
    let Ok(key_bytes) = hex::decode(public_key_hex) else {
        return false;
    };
    let Ok(sig_bytes) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(&key_bytes) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(&sig_bytes) else {
        return false;
    };
    verifying_key.verify(message, &signature).is_ok()
}

/// Generates a fresh secp256k1 keypair, returning `(public_key_hex, private_key_hex)`.
pub fn generate_keypair() -> (String, String) {
    let signing_key = SigningKey::random(&mut rand::thread_rng());
    let verifying_key = VerifyingKey::from(&signing_key);
    let public_hex = hex::encode(verifying_key.to_encoded_point(false).as_bytes());
    let private_hex = hex::encode(signing_key.to_bytes());
    (public_hex, private_hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_is_deterministic() {
        assert_eq!(sha256_hex(b"hello"), sha256_hex(b"hello"));
        assert_ne!(sha256_hex(b"hello"), sha256_hex(b"world"));
    }

    #[test]
    fn address_derivation_is_deterministic() {
        let (public, _) = generate_keypair();
        let public_bytes = hex::decode(&public).unwrap();
        let a1 = address_from_public_key(&public_bytes);
        let a2 = address_from_public_key(&public_bytes);
        assert_eq!(a1, a2);
        assert!(!a1.is_empty());
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let (public, private) = generate_keypair();
        let message = b"transfer 1.0 to someone";
        let signature = sign(&private, message).unwrap();
        assert!(verify(&public, &signature, message));
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let (public, private) = generate_keypair();
        let signature = sign(&private, b"original").unwrap();
        assert!(!verify(&public, &signature, b"tampered"));
    }

    #[test]
    fn verify_rejects_tampered_signature() {
        let (public, private) = generate_keypair();
        let mut signature = sign(&private, b"original").unwrap();
        let last = signature.pop().unwrap();
        signature.push(if last == '0' { '1' } else { '0' });
        assert!(!verify(&public, &signature, b"original"));
    }
}
