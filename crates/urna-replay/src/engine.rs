//! The replay state machine.
//!
//! [`ReplayEngine::apply`] is the transition function: one exhaustive match
//! arm per [`ActionKind`], folding the ordered action sequence into a
//! [`RegistryState`] with one hydrated target poll. Replay is strictly
//! sequential — later transitions (merges, deactivations) depend on state
//! built by earlier ones — and every invariant violation is fatal: the
//! engine aborts rather than continuing from a possibly inconsistent state.

use crate::action::{Action, ActionKind};
use crate::error::{ReplayError, Result};
use crate::poll::PollState;
use crate::registry::RegistryState;
use tracing::{debug, info, warn};
use urna_core::{Keypair, PollCounts, PollParams};

/// The outcome of a reconstruction run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconstruction {
    /// The reconstructed registry with the target poll hydrated.
    pub registry: RegistryState,
    /// Whether message-derived bookkeeping was skipped for lack of the
    /// coordinator capability. A partial reconstruction still verifies root
    /// consistency but carries no semantic message content.
    pub partial: bool,
}

/// Applies ordered actions to a fresh registry.
#[derive(Debug)]
pub struct ReplayEngine {
    registry: RegistryState,
    target: usize,
    params: PollParams,
    capability: Option<Keypair>,
    partial: bool,
}

impl ReplayEngine {
    /// Create an engine reconstructing poll `target`.
    ///
    /// `params` are the target poll's authoritative deployment parameters.
    /// Without `capability` the run is read-only: publish, key-deactivation
    /// and key-generation attempts are skipped and the result is flagged
    /// partial.
    #[must_use]
    pub fn new(target: usize, params: PollParams, capability: Option<Keypair>) -> Self {
        Self {
            registry: RegistryState::new(),
            target,
            params,
            capability,
            partial: false,
        }
    }

    /// Apply one action. Actions must arrive in their total order.
    pub fn apply(&mut self, action: &Action) -> Result<()> {
        debug!(block = action.block, index = action.index, kind = ?action.kind.tag(), "applying action");
        match &action.kind {
            ActionKind::SignUp { participant } => {
                self.registry.sign_up(participant.clone());
            }
            ActionKind::DeployPoll { poll } => {
                let deployed = self.registry.num_polls();
                if *poll != deployed {
                    return Err(ReplayError::NonContiguousPoll { index: *poll, deployed });
                }
                if *poll == self.target {
                    self.registry.deploy_poll(PollState::new(self.target, self.params));
                } else {
                    self.registry.deploy_null_poll();
                }
            }
            ActionKind::PublishMessage { message, ephemeral } => {
                if self.capability.is_some() {
                    self.target_poll_mut()?.publish_message(message.clone(), ephemeral);
                } else {
                    // The leaf is ciphertext-derived and needs no secret, so
                    // the message root stays verifiable even read-only.
                    self.skip("publish-message plaintext bookkeeping");
                    self.target_poll_mut()?.enqueue_message_leaf(message, ephemeral);
                }
            }
            ActionKind::TopUp { message } => {
                // Top-up values are public; no capability needed.
                self.target_poll_mut()?.top_up(message.clone());
            }
            ActionKind::AttemptKeyDeactivation { message, ephemeral } => {
                if let Some(coordinator) = self.capability {
                    self.target_poll_mut()?.attempt_key_deactivation(&coordinator, message, ephemeral);
                } else {
                    self.skip("key-deactivation attempt");
                }
            }
            ActionKind::DeactivateKey { key_hash, ciphertext } => {
                // Authoritative regardless of capability: the payload is the
                // finalized ciphertext, not a message needing decryption.
                self.target_poll_mut()?.record_key_deactivation(*key_hash, *ciphertext);
            }
            ActionKind::AttemptKeyGeneration { message, ephemeral, new_index } => {
                if let Some(coordinator) = self.capability {
                    self.target_poll_mut()?.generate_key(&coordinator, message, ephemeral, *new_index);
                } else {
                    self.skip("key-generation attempt");
                }
            }
            ActionKind::MergeSignupSubRoots { poll, num_ops } => {
                // Every poll's contract emits this against the one shared
                // accumulator; consolidation with nothing pending is a no-op,
                // so later-poll duplicates are harmless.
                debug!(poll, num_ops, "consolidating signup sub-roots");
                self.registry.merge_signup_sub_roots(*num_ops);
            }
            ActionKind::MergeSignupTree { poll } => {
                if *poll == 0 {
                    self.registry.merge_signup_tree()?;
                } else {
                    // Duplicate emission from a later poll; poll 0's action
                    // is the authoritative one for the shared registry.
                    debug!(poll, "ignoring duplicate signup-tree merge");
                }
            }
            ActionKind::MergeMessageSubRoots { num_ops } => {
                self.target_poll_mut()?.merge_message_sub_roots(*num_ops);
            }
            ActionKind::MergeMessageTree { expected_root } => {
                let root = self.target_poll_mut()?.merge_message_tree(*expected_root)?;
                debug!(%root, "message root matches the recorded root");
            }
        }
        Ok(())
    }

    /// Cross-validate against authoritative counters and return the result.
    ///
    /// Message counts are only checked when the capability was present; a
    /// partial run deliberately under-collects messages.
    pub fn finish(self, counts: &PollCounts) -> Result<Reconstruction> {
        let mut registry = self.registry;
        let check_messages = self.capability.is_some();
        let poll = registry
            .poll_mut(self.target)
            .ok_or(ReplayError::MissingPoll(self.target))?;
        if check_messages && poll.messages.len() as u64 != counts.num_messages {
            return Err(ReplayError::CountMismatch {
                reconstructed: poll.messages.len() as u64,
                expected: counts.num_messages,
            });
        }
        poll.num_signups = counts.num_signups;
        info!(
            poll = self.target,
            participants = registry.participants.len(),
            partial = self.partial,
            "replay finished"
        );
        Ok(Reconstruction { registry, partial: self.partial })
    }

    fn target_poll_mut(&mut self) -> Result<&mut PollState> {
        self.registry
            .poll_mut(self.target)
            .ok_or(ReplayError::PollNotDeployed(self.target))
    }

    fn skip(&mut self, what: &str) {
        warn!(action = what, "no decryption capability; skipping (partial reconstruction)");
        self.partial = true;
    }
}
