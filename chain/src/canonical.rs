//! Canonical, key-sorted byte encoding used for every hash and signature in
//! the system.
//!
//! This is the single choke point all hashing/signing code must go through:
//! never call `serde_json::to_vec` directly on a domain type. Object keys
//! come out lexicographically sorted because `serde_json::Value`'s map is
//! `BTreeMap`-backed when the `preserve_order` feature is disabled (it is,
//! in this workspace), so converting through `Value` is sufficient to match
//! a peer encoding with `json.dumps(x, sort_keys=True)`.

use serde::Serialize;

use crate::error::CanonicalError;

/// Produces the canonical byte encoding of `value`.
pub fn canon<T: Serialize>(value: &T) -> Result<Vec<u8>, CanonicalError> {
    let as_value = serde_json::to_value(value).map_err(CanonicalError::Encode)?;
    serde_json::to_vec(&as_value).map_err(CanonicalError::Encode)
}

/// Hex-encoded SHA-256 of `canon(value)`.
pub fn canon_hash<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    Ok(crate::crypto::sha256_hex(&canon(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Unordered {
        z: i32,
        a: i32,
        m: i32,
    }

    #[test]
    fn object_keys_are_sorted() {
        let bytes = canon(&Unordered { z: 1, a: 2, m: 3 }).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, r#"{"a":2,"m":3,"z":1}"#);
    }

    #[test]
    fn nested_maps_sort_recursively() {
        let mut inner = HashMap::new();
        inner.insert("zeta".to_string(), 1);
        inner.insert("alpha".to_string(), 2);
        let bytes = canon(&inner).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, r#"{"alpha":2,"zeta":1}"#);
    }

    #[test]
    fn canon_is_stable_across_calls() {
        let a = canon(&Unordered { z: 1, a: 2, m: 3 }).unwrap();
        let b = canon(&Unordered { z: 1, a: 2, m: 3 }).unwrap();
        assert_eq!(a, b);
    }
}
