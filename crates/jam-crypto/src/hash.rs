// Path: crates/jam-crypto/src/hash.rs

use sha3::{Digest, Keccak256};

/// Thin wrapper over the inner hash function the wire format commits to.
/// Kept as a trait so callers needing a different algorithm for a given
/// commitment can swap it without touching the Merkle tree logic.
pub trait HashFunction {
    fn hash(&self, data: &[u8]) -> [u8; 32];
    fn name(&self) -> &'static str;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Keccak256Hash;

impl HashFunction for Keccak256Hash {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        keccak256(data)
    }

    fn name(&self) -> &'static str {
        "keccak256"
    }
}

/// Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Keccak-256 of the concatenation of `left` and `right`, used to combine
/// two Merkle subtree roots into their parent.
pub fn keccak256_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(left);
    buf.extend_from_slice(right);
    keccak256(&buf)
}
