//! Hashing and randomness primitives
//!
//! Platform hashes are double SHA-256 (`sha256(sha256(data))`).

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Single SHA-256 digest
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Double SHA-256 digest
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// 32 bytes from the thread-local CSPRNG
pub fn random_bytes32() -> [u8; 32] {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256d_is_double() {
        assert_eq!(sha256d(b"abc"), sha256(&sha256(b"abc")));
        assert_ne!(sha256d(b"abc"), sha256(b"abc"));
    }

    #[test]
    fn test_random_bytes_differ() {
        assert_ne!(random_bytes32(), random_bytes32());
    }
}
