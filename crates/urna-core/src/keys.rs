//! Participant and coordinator key material.
//!
//! Real signature and encryption schemes are external to this workspace: the
//! replay core never verifies a signature or decrypts a ballot. What it does
//! need is (a) public keys as stable identities that hash into registry
//! leaves, and (b) a deterministic shared-key derivation so the coordinator's
//! keypair can reproduce the bookkeeping hashes (deactivation keys) that the
//! live protocol computed. The derivations here are domain-separated hashes;
//! they stand in for the curve arithmetic without changing any of the
//! ordering or state-transition behavior this crate's consumers care about.

use crate::field::Field;
use crate::hash::hash_fields;
use rand::RngCore;
use serde::{Deserialize, Serialize};

const DOMAIN_PUB_X: &str = "urna.keys.public.x";
const DOMAIN_PUB_Y: &str = "urna.keys.public.y";
const DOMAIN_PUB_HASH: &str = "urna.keys.public.hash";
const DOMAIN_SHARED: &str = "urna.keys.shared";

/// A public key as an affine coordinate pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    /// Affine x coordinate.
    pub x: Field,
    /// Affine y coordinate.
    pub y: Field,
}

impl PublicKey {
    /// Commitment to this key, used inside registry leaves.
    #[must_use]
    pub fn hash(&self) -> Field {
        hash_fields(DOMAIN_PUB_HASH, &[self.x, self.y])
    }
}

/// A secret scalar.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKey(Field);

impl SecretKey {
    /// Wrap a scalar.
    #[must_use]
    pub const fn new(scalar: Field) -> Self {
        Self(scalar)
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secrets never reach logs.
        f.write_str("SecretKey(..)")
    }
}

/// A secret/public keypair.
///
/// The coordinator's keypair is the "decryption capability" of the replay
/// engine: reconstruction runs that hold one can reproduce message-derived
/// bookkeeping; runs that do not are partial (root consistency only).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keypair {
    secret: SecretKey,
    public: PublicKey,
}

impl Keypair {
    /// Derive the keypair for a secret scalar.
    #[must_use]
    pub fn from_secret(secret: SecretKey) -> Self {
        let public = PublicKey {
            x: hash_fields(DOMAIN_PUB_X, &[secret.0]),
            y: hash_fields(DOMAIN_PUB_Y, &[secret.0]),
        };
        Self { secret, public }
    }

    /// Sample a fresh keypair.
    pub fn random(rng: &mut impl RngCore) -> Self {
        let mut scalar = [0u8; 32];
        rng.fill_bytes(&mut scalar);
        Self::from_secret(SecretKey::new(Field::from_bytes(scalar)))
    }

    /// The public half.
    #[must_use]
    pub const fn public(&self) -> PublicKey {
        self.public
    }

    /// Derive the symmetric key shared with an ephemeral public key.
    ///
    /// Deterministic in `(secret, ephemeral)`; both the live protocol and a
    /// replay therefore derive the same deactivation key hashes.
    #[must_use]
    pub fn shared_key(&self, ephemeral: &PublicKey) -> Field {
        hash_fields(DOMAIN_SHARED, &[self.secret.0, ephemeral.x, ephemeral.y])
    }
}
