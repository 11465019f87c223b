//! Domain-separated hashing for protocol commitments.
//!
//! Hashing is pure and synchronous, so it lives behind plain functions rather
//! than a collaborator trait. The algorithm is selected in exactly one place:
//! every commitment in the workspace (tree leaves, tree nodes, key hashes)
//! goes through this module, so swapping SHA-256 for another 256-bit hash is
//! a one-file change.
//!
//! Every call site supplies a domain string. Two hashes computed under
//! different domains never collide by construction, which keeps leaf hashes,
//! internal node hashes, and key-derivation hashes in disjoint spaces.

use crate::field::Field;
use sha2::{Digest, Sha256};

/// Incremental hasher over protocol words.
#[derive(Clone)]
pub struct Hasher {
    inner: Sha256,
}

impl Hasher {
    /// Absorb a raw byte slice.
    pub fn update(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    /// Absorb one protocol word.
    pub fn update_field(&mut self, word: &Field) {
        self.inner.update(word.as_bytes());
    }

    /// Produce the digest as a protocol word.
    #[must_use]
    pub fn finalize(self) -> Field {
        let digest: [u8; 32] = self.inner.finalize().into();
        Field::from_bytes(digest)
    }
}

impl std::fmt::Debug for Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Hasher(..)")
    }
}

/// Start an incremental hash under `domain`.
///
/// The domain string is absorbed length-prefixed so that no choice of domain
/// can alias another domain plus payload prefix.
#[must_use]
pub fn hasher(domain: &str) -> Hasher {
    let mut inner = Sha256::new();
    inner.update((domain.len() as u64).to_be_bytes());
    inner.update(domain.as_bytes());
    Hasher { inner }
}

/// Hash a sequence of protocol words under `domain`.
#[must_use]
pub fn hash_fields(domain: &str, words: &[Field]) -> Field {
    let mut h = hasher(domain);
    for word in words {
        h.update_field(word);
    }
    h.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = hash_fields("urna.test", &[Field::from_u64(1), Field::from_u64(2)]);
        let b = hash_fields("urna.test", &[Field::from_u64(1), Field::from_u64(2)]);
        assert_eq!(a, b);
    }

    #[test]
    fn domains_are_disjoint() {
        let words = [Field::from_u64(7)];
        assert_ne!(hash_fields("urna.a", &words), hash_fields("urna.b", &words));
    }

    #[test]
    fn domain_cannot_alias_payload() {
        // "ab" + [] must differ from "a" + words starting with 'b' bytes.
        let under_ab = hash_fields("ab", &[]);
        let mut h = hasher("a");
        h.update(b"b");
        assert_ne!(under_ab, h.finalize());
    }

    #[test]
    fn incremental_matches_oneshot() {
        let words = [Field::from_u64(3), Field::from_u64(4)];
        let mut h = hasher("urna.test");
        for w in &words {
            h.update_field(w);
        }
        assert_eq!(h.finalize(), hash_fields("urna.test", &words));
    }
}
