//! Published message records and their commitment hashes.

use crate::field::Field;
use crate::hash::hasher;
use crate::keys::PublicKey;
use serde::{Deserialize, Serialize};

const DOMAIN_MESSAGE_LEAF: &str = "urna.message.leaf";
const DOMAIN_KEY_HASH: &str = "urna.message.key-hash";

/// Number of payload words in a well-formed message.
pub const MESSAGE_WORDS: usize = 10;

/// One published command ciphertext, exactly as recorded on chain.
///
/// The payload stays opaque here: decrypting it into a vote command is the
/// job of an external component. Replay only needs the message's accumulator
/// leaf and, for key-deactivation attempts, the hash it is filed under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message type discriminant (vote, top-up, deactivation, ...).
    pub msg_type: u64,
    /// Opaque ciphertext words.
    pub data: Vec<Field>,
}

impl Message {
    /// Build a message from its recorded words.
    #[must_use]
    pub fn new(msg_type: u64, data: Vec<Field>) -> Self {
        Self { msg_type, data }
    }

    /// The accumulator leaf for this message.
    ///
    /// Binds the ciphertext to the ephemeral key it was published with, as
    /// the on-chain queue does.
    #[must_use]
    pub fn leaf(&self, ephemeral: &PublicKey) -> Field {
        let mut h = hasher(DOMAIN_MESSAGE_LEAF);
        h.update_field(&Field::from_u64(self.msg_type));
        for word in &self.data {
            h.update_field(word);
        }
        h.update_field(&ephemeral.x);
        h.update_field(&ephemeral.y);
        h.finalize()
    }

    /// The hash a key-deactivation attempt is recorded under.
    ///
    /// Derived from the ciphertext and the coordinator's shared key so that
    /// only a capability-holding reconstruction can reproduce it.
    #[must_use]
    pub fn key_hash(&self, shared_key: Field) -> Field {
        let mut h = hasher(DOMAIN_KEY_HASH);
        h.update_field(&shared_key);
        h.update_field(&Field::from_u64(self.msg_type));
        for word in &self.data {
            h.update_field(word);
        }
        h.finalize()
    }
}

/// An ElGamal-style ciphertext pair attached to a finalized key deactivation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    /// First component.
    pub c1: Field,
    /// Second component.
    pub c2: Field,
}
