//! Recorded actions and their total ordering.
//!
//! Each contract emits its own log; no single source sees the whole protocol.
//! Reconstruction therefore collects one batch of [`Action`]s per kind and
//! merges them into a single sequence ordered by `(block, index)` — the block
//! ordinal and the within-block sequence ordinal of the emitting transaction.

use serde::{Deserialize, Serialize};
use tracing::warn;
use urna_core::{Ciphertext, Field, Message, Participant, PublicKey};

/// One observed occurrence, tagged by kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Block ordinal of the emitting transaction.
    pub block: u64,
    /// Sequence ordinal within the block.
    pub index: u64,
    /// Kind and kind-specific payload.
    pub kind: ActionKind,
}

impl Action {
    /// The global ordering key.
    #[must_use]
    pub const fn ordinal(&self) -> (u64, u64) {
        (self.block, self.index)
    }
}

/// Every action kind the protocol records, as a closed enum.
///
/// The replay engine matches exhaustively on this type, so adding a kind
/// without handling it is a compile error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// A participant signed up on the root registry.
    SignUp {
        /// The new participant record.
        participant: Participant,
    },
    /// A poll contract was deployed.
    DeployPoll {
        /// Index assigned to the poll; must be contiguous.
        poll: usize,
    },
    /// A message was published to the target poll.
    PublishMessage {
        /// The recorded ciphertext.
        message: Message,
        /// Ephemeral key the message was encrypted to.
        ephemeral: PublicKey,
    },
    /// A public credit top-up message.
    TopUp {
        /// The recorded top-up message.
        message: Message,
    },
    /// A participant attempted to deactivate a key.
    AttemptKeyDeactivation {
        /// The recorded ciphertext.
        message: Message,
        /// Ephemeral key the message was encrypted to.
        ephemeral: PublicKey,
    },
    /// The message processor finalized a key deactivation.
    DeactivateKey {
        /// Hash the deactivation is filed under.
        key_hash: Field,
        /// Finalized ciphertext pair.
        ciphertext: Ciphertext,
    },
    /// A participant requested a replacement key.
    AttemptKeyGeneration {
        /// The recorded ciphertext.
        message: Message,
        /// Ephemeral key the message was encrypted to.
        ephemeral: PublicKey,
        /// Asserted index of the replacement participant record.
        new_index: u64,
    },
    /// Sub-root consolidation on the shared signup accumulator.
    MergeSignupSubRoots {
        /// Poll whose contract emitted the action.
        poll: usize,
        /// Queue operations consumed; `0` means all outstanding.
        num_ops: usize,
    },
    /// Full merge of the shared signup accumulator.
    MergeSignupTree {
        /// Poll whose contract emitted the action.
        poll: usize,
    },
    /// Sub-root consolidation on the target poll's message accumulator.
    MergeMessageSubRoots {
        /// Queue operations consumed; `0` means all outstanding.
        num_ops: usize,
    },
    /// Full merge of the target poll's message accumulator.
    MergeMessageTree {
        /// Root recorded on chain; the reconstructed root must match.
        expected_root: Field,
    },
}

impl ActionKind {
    /// The fieldless tag of this kind.
    #[must_use]
    pub const fn tag(&self) -> ActionTag {
        match self {
            Self::SignUp { .. } => ActionTag::SignUp,
            Self::DeployPoll { .. } => ActionTag::DeployPoll,
            Self::PublishMessage { .. } => ActionTag::PublishMessage,
            Self::TopUp { .. } => ActionTag::TopUp,
            Self::AttemptKeyDeactivation { .. } => ActionTag::AttemptKeyDeactivation,
            Self::DeactivateKey { .. } => ActionTag::DeactivateKey,
            Self::AttemptKeyGeneration { .. } => ActionTag::AttemptKeyGeneration,
            Self::MergeSignupSubRoots { .. } => ActionTag::MergeSignupSubRoots,
            Self::MergeSignupTree { .. } => ActionTag::MergeSignupTree,
            Self::MergeMessageSubRoots { .. } => ActionTag::MergeMessageSubRoots,
            Self::MergeMessageTree { .. } => ActionTag::MergeMessageTree,
        }
    }
}

/// Fieldless action-kind tags, used to address per-kind log queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionTag {
    /// See [`ActionKind::SignUp`].
    SignUp,
    /// See [`ActionKind::DeployPoll`].
    DeployPoll,
    /// See [`ActionKind::PublishMessage`].
    PublishMessage,
    /// See [`ActionKind::TopUp`].
    TopUp,
    /// See [`ActionKind::AttemptKeyDeactivation`].
    AttemptKeyDeactivation,
    /// See [`ActionKind::DeactivateKey`].
    DeactivateKey,
    /// See [`ActionKind::AttemptKeyGeneration`].
    AttemptKeyGeneration,
    /// See [`ActionKind::MergeSignupSubRoots`].
    MergeSignupSubRoots,
    /// See [`ActionKind::MergeSignupTree`].
    MergeSignupTree,
    /// See [`ActionKind::MergeMessageSubRoots`].
    MergeMessageSubRoots,
    /// See [`ActionKind::MergeMessageTree`].
    MergeMessageTree,
}

impl ActionTag {
    /// Every tag, in the order batches are conventionally fetched.
    pub const ALL: [Self; 11] = [
        Self::SignUp,
        Self::DeployPoll,
        Self::PublishMessage,
        Self::TopUp,
        Self::AttemptKeyDeactivation,
        Self::DeactivateKey,
        Self::AttemptKeyGeneration,
        Self::MergeSignupSubRoots,
        Self::MergeSignupTree,
        Self::MergeMessageSubRoots,
        Self::MergeMessageTree,
    ];
}

/// Merge per-kind batches into one totally ordered sequence.
///
/// Orders by `(block, index)` ascending with a stable sort: equal-key actions
/// keep their relative input order. No action is dropped or duplicated. Two
/// actions of different kinds sharing both ordinals would make the order
/// depend on batch order; the upstream log source promises this never
/// happens, and a violation is logged rather than repaired.
#[must_use]
pub fn order_actions(batches: Vec<Vec<Action>>) -> Vec<Action> {
    let mut actions: Vec<Action> = batches.into_iter().flatten().collect();
    actions.sort_by_key(Action::ordinal);
    for pair in actions.windows(2) {
        if pair[0].ordinal() == pair[1].ordinal() && pair[0].kind.tag() != pair[1].kind.tag() {
            warn!(
                block = pair[0].block,
                index = pair[0].index,
                first = ?pair[0].kind.tag(),
                second = ?pair[1].kind.tag(),
                "ordering ambiguity: two kinds share an ordering key"
            );
        }
    }
    actions
}
