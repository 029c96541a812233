//! Cryptographic utilities for OTP hashing and token comparison.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a hex string.
///
/// Used to store one-time codes: only the hash is ever persisted, and the
/// hash doubles as the opaque reset token echoed back by the client.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time equality for secret-bearing strings.
///
/// Length mismatch short-circuits; equal-length inputs are compared without
/// early exit so the comparison time does not leak the match position.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex("test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        assert_eq!(sha256_hex("483921"), sha256_hex("483921"));
    }

    #[test]
    fn test_sha256_hex_different_inputs() {
        assert_ne!(sha256_hex("483921"), sha256_hex("483922"));
    }

    #[test]
    fn test_constant_time_eq_equal() {
        assert!(constant_time_eq("abcdef", "abcdef"));
        assert!(constant_time_eq("", ""));
    }

    #[test]
    fn test_constant_time_eq_unequal() {
        assert!(!constant_time_eq("abcdef", "abcdeg"));
        assert!(!constant_time_eq("abcdef", "abcde"));
        assert!(!constant_time_eq("abcdef", ""));
    }

    #[test]
    fn test_constant_time_eq_on_hashes() {
        let stored = sha256_hex("123456");
        assert!(constant_time_eq(&stored, &sha256_hex("123456")));
        assert!(!constant_time_eq(&stored, &sha256_hex("654321")));
    }
}
