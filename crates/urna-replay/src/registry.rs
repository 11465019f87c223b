//! Root registry state shared by every poll.

use crate::accumulator::Accumulator;
use crate::error::Result;
use crate::poll::PollState;
use serde::{Deserialize, Serialize};
use urna_core::{Field, Participant};

/// Depth of the shared signup tree. Fixed by the circuit family; the
/// on-chain value is cross-checked against this before replay starts.
pub const SIGNUP_TREE_DEPTH: usize = 10;

/// Sub-tree depth of the shared signup accumulator.
pub const SIGNUP_SUB_DEPTH: usize = 2;

/// The root-level protocol state for one reconstruction run.
///
/// Owned by exactly one run and mutated monotonically: participants and
/// polls are appended, never removed or reordered. Polls other than the
/// reconstruction target are kept as `None` placeholders so that poll
/// indices stay stable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    /// Signed-up participants, in signup order.
    pub participants: Vec<Participant>,
    /// Deployed polls by index; non-target polls are placeholders.
    pub polls: Vec<Option<PollState>>,
    /// The shared signup accumulator. All polls reference this one
    /// accumulator; it is not per-poll state.
    pub signup_acc: Accumulator,
}

impl RegistryState {
    /// Empty registry: no participants, no polls.
    #[must_use]
    pub fn new() -> Self {
        Self {
            participants: Vec::new(),
            polls: Vec::new(),
            signup_acc: Accumulator::new(SIGNUP_SUB_DEPTH),
        }
    }

    /// Append a participant and queue their signup leaf.
    pub fn sign_up(&mut self, participant: Participant) {
        self.signup_acc.append(participant.leaf());
        self.participants.push(participant);
    }

    /// Record a fully hydrated poll at the next index.
    pub fn deploy_poll(&mut self, poll: PollState) {
        debug_assert_eq!(poll.index, self.polls.len());
        self.polls.push(Some(poll));
    }

    /// Record a placeholder for a poll that is not being reconstructed.
    pub fn deploy_null_poll(&mut self) {
        self.polls.push(None);
    }

    /// Number of polls deployed so far, placeholders included.
    #[must_use]
    pub fn num_polls(&self) -> usize {
        self.polls.len()
    }

    /// The hydrated poll at `index`, if deployed and hydrated.
    #[must_use]
    pub fn poll(&self, index: usize) -> Option<&PollState> {
        self.polls.get(index).and_then(Option::as_ref)
    }

    /// Mutable access to the hydrated poll at `index`.
    pub fn poll_mut(&mut self, index: usize) -> Option<&mut PollState> {
        self.polls.get_mut(index).and_then(Option::as_mut)
    }

    /// Consolidate pending signup leaves into sub-roots.
    pub fn merge_signup_sub_roots(&mut self, num_ops: usize) {
        self.signup_acc.merge_sub_roots(num_ops);
    }

    /// Finalize the signup root at the registry depth.
    pub fn merge_signup_tree(&mut self) -> Result<Field> {
        self.signup_acc.merge(SIGNUP_TREE_DEPTH)
    }
}

impl Default for RegistryState {
    fn default() -> Self {
        Self::new()
    }
}
