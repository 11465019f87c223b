//! The 32-byte scalar word underlying every commitment in the protocol.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte protocol word.
///
/// Message payload words, accumulator leaves and roots, key coordinates, and
/// deactivation key hashes are all `Field` values. The type is opaque: the
/// only ways to produce one are the constructors here and the [`crate::hash`]
/// module.
///
/// Ordered so it can key `BTreeMap`s (deactivation records are kept in
/// deterministic order).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Field([u8; 32]);

impl Field {
    /// The all-zeroes word.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Wrap raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Embed a small integer (big-endian, low 8 bytes).
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether this is the zero word.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({})", hex::encode(self.0))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Field {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<u64> for Field {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u64_is_big_endian_in_low_bytes() {
        let f = Field::from_u64(0x0102);
        assert_eq!(f.as_bytes()[30], 0x01);
        assert_eq!(f.as_bytes()[31], 0x02);
        assert!(f.as_bytes()[..24].iter().all(|b| *b == 0));
    }

    #[test]
    fn zero_is_zero() {
        assert!(Field::ZERO.is_zero());
        assert!(!Field::from_u64(1).is_zero());
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(Field::ZERO.to_string(), "0".repeat(64));
    }

    #[test]
    fn ordering_matches_byte_order() {
        assert!(Field::from_u64(1) < Field::from_u64(2));
    }

    #[test]
    fn serde_round_trip() {
        let word = Field::from_u64(42);
        let json = serde_json::to_string(&word).unwrap();
        let back: Field = serde_json::from_str(&json).unwrap();
        assert_eq!(back, word);
    }
}
