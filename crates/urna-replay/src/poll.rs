//! Per-poll reconstruction state.

use crate::accumulator::Accumulator;
use crate::error::{ReplayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use urna_core::{Ciphertext, Field, Keypair, Message, PollParams, PublicKey};

/// A key-rotation request recorded for later processing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyGeneration {
    /// Hash identifying the key being replaced.
    pub key_hash: Field,
    /// Asserted index of the replacement participant record.
    pub new_index: u64,
}

/// The state of one voting poll.
///
/// `messages` grows only by append, and `index` equals this poll's position
/// in the registry's poll list for the whole lifetime of the value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollState {
    /// Position in the registry's poll list. Immutable once assigned.
    pub index: usize,
    /// Deployment parameters.
    pub params: PollParams,
    /// Published messages, in replay order.
    pub messages: Vec<Message>,
    /// Key hashes of deactivation attempts, in replay order.
    pub deactivation_attempts: Vec<Field>,
    /// Finalized key deactivations by key hash.
    pub key_deactivations: BTreeMap<Field, Ciphertext>,
    /// Key-rotation requests, in replay order.
    pub key_generations: Vec<KeyGeneration>,
    /// Accumulator over message leaves.
    pub message_acc: Accumulator,
    /// Authoritative signup count, adopted after replay.
    pub num_signups: u64,
}

impl PollState {
    /// Create the state for a freshly deployed poll.
    #[must_use]
    pub fn new(index: usize, params: PollParams) -> Self {
        Self {
            index,
            params,
            messages: Vec::new(),
            deactivation_attempts: Vec::new(),
            key_deactivations: BTreeMap::new(),
            key_generations: Vec::new(),
            message_acc: Accumulator::new(params.tree_depths.message_sub),
            num_signups: 0,
        }
    }

    /// Record a published message and queue its accumulator leaf.
    pub fn publish_message(&mut self, message: Message, ephemeral: &PublicKey) {
        self.enqueue_message_leaf(&message, ephemeral);
        self.messages.push(message);
    }

    /// Queue a message's accumulator leaf without the plaintext-side
    /// bookkeeping.
    ///
    /// The leaf binds only the ciphertext and the ephemeral key, so it needs
    /// no decryption capability. Read-only reconstructions use this path to
    /// keep the message root verifiable.
    pub fn enqueue_message_leaf(&mut self, message: &Message, ephemeral: &PublicKey) {
        self.message_acc.append(message.leaf(ephemeral));
    }

    /// Record a public credit top-up.
    ///
    /// Top-ups carry no ephemeral key; the on-chain queue pads the leaf with
    /// the zero key.
    pub fn top_up(&mut self, message: Message) {
        self.message_acc.append(message.leaf(&Self::pad_key()));
        self.messages.push(message);
    }

    /// Record a key-deactivation attempt under its coordinator-derived hash.
    pub fn attempt_key_deactivation(
        &mut self,
        coordinator: &Keypair,
        message: &Message,
        ephemeral: &PublicKey,
    ) {
        let key_hash = message.key_hash(coordinator.shared_key(ephemeral));
        self.deactivation_attempts.push(key_hash);
    }

    /// Record a finalized key deactivation.
    ///
    /// Authoritative regardless of any capability: the payload is already
    /// the finalized ciphertext. A repeated key hash overwrites — the later
    /// occurrence wins, as on chain.
    pub fn record_key_deactivation(&mut self, key_hash: Field, ciphertext: Ciphertext) {
        self.key_deactivations.insert(key_hash, ciphertext);
    }

    /// Record a key-rotation request with its asserted new index.
    pub fn generate_key(
        &mut self,
        coordinator: &Keypair,
        message: &Message,
        ephemeral: &PublicKey,
        new_index: u64,
    ) {
        let key_hash = message.key_hash(coordinator.shared_key(ephemeral));
        self.key_generations.push(KeyGeneration { key_hash, new_index });
    }

    /// Consolidate pending message leaves into sub-roots.
    pub fn merge_message_sub_roots(&mut self, num_ops: usize) {
        self.message_acc.merge_sub_roots(num_ops);
    }

    /// Finalize the message root and check it against the recorded root.
    pub fn merge_message_tree(&mut self, expected_root: Field) -> Result<Field> {
        let computed = self.message_acc.merge(self.params.tree_depths.message)?;
        if computed != expected_root {
            return Err(ReplayError::RootMismatch { computed, expected: expected_root });
        }
        Ok(computed)
    }

    fn pad_key() -> PublicKey {
        PublicKey { x: Field::ZERO, y: Field::ZERO }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use urna_core::{BatchSizes, MaxValues, SecretKey, TreeDepths};

    fn params() -> PollParams {
        PollParams {
            deploy_time: 100,
            duration: 600,
            tree_depths: TreeDepths { int_signup: 1, message: 4, message_sub: 2, vote_option: 2 },
            batch_sizes: BatchSizes { message: 4, tally: 4 },
            max_values: MaxValues { max_messages: 16, max_vote_options: 4 },
        }
    }

    fn keypair(seed: u64) -> Keypair {
        Keypair::from_secret(SecretKey::new(Field::from_u64(seed)))
    }

    fn message(seed: u64) -> Message {
        Message::new(1, vec![Field::from_u64(seed)])
    }

    #[test]
    fn messages_grow_by_append() {
        let mut poll = PollState::new(0, params());
        poll.publish_message(message(1), &keypair(9).public());
        poll.top_up(message(2));
        assert_eq!(poll.messages.len(), 2);
        assert_eq!(poll.message_acc.num_leaves(), 2);
    }

    #[test]
    fn message_root_matches_expected() {
        let mut poll = PollState::new(0, params());
        let eph = keypair(9).public();
        for seed in 0..4 {
            poll.publish_message(message(seed), &eph);
        }
        poll.merge_message_sub_roots(0);
        // Compute the root the way the chain would have recorded it.
        let mut reference = Accumulator::new(2);
        for seed in 0..4 {
            reference.append(message(seed).leaf(&eph));
        }
        reference.merge_sub_roots(0);
        let expected = reference.merge(4).unwrap();
        assert_eq!(poll.merge_message_tree(expected).unwrap(), expected);
    }

    #[test]
    fn wrong_recorded_root_is_fatal() {
        let mut poll = PollState::new(0, params());
        poll.publish_message(message(1), &keypair(9).public());
        poll.merge_message_sub_roots(0);
        let err = poll.merge_message_tree(Field::from_u64(123)).unwrap_err();
        assert!(matches!(err, ReplayError::RootMismatch { .. }));
    }

    #[test]
    fn later_deactivation_wins() {
        let mut poll = PollState::new(0, params());
        let key_hash = Field::from_u64(7);
        poll.record_key_deactivation(key_hash, Ciphertext { c1: Field::from_u64(1), c2: Field::ZERO });
        poll.record_key_deactivation(key_hash, Ciphertext { c1: Field::from_u64(2), c2: Field::ZERO });
        assert_eq!(poll.key_deactivations[&key_hash].c1, Field::from_u64(2));
    }

    #[test]
    fn deactivation_attempt_uses_shared_key() {
        let mut poll = PollState::new(0, params());
        let coordinator = keypair(1);
        let eph = keypair(2).public();
        let msg = message(5);
        poll.attempt_key_deactivation(&coordinator, &msg, &eph);
        let expected = msg.key_hash(coordinator.shared_key(&eph));
        assert_eq!(poll.deactivation_attempts, vec![expected]);
    }
}
