//! Deterministic reconstruction of Urna protocol state from recorded actions.
//!
//! The protocol's authoritative state lives across several contracts — a root
//! registry, one contract per poll, and a per-poll message processor — each
//! emitting its own action log. No single log holds the full picture. This
//! crate rebuilds the state the protocol itself would have reached: it merges
//! the per-kind logs into one totally ordered sequence and folds that
//! sequence through a transition function per action kind.
//!
//! # Architecture
//!
//! - [`Accumulator`]: incremental Merkle accumulator with the on-chain
//!   queues' two-phase merge (sub-roots, then a root at a target depth)
//! - [`Action`] / [`order_actions`]: recorded occurrences and their stable
//!   total order by `(block, index)`
//! - [`RegistryState`] / [`PollState`]: the reconstructed state, owned by one
//!   run and mutated monotonically
//! - [`ReplayEngine`]: the transition function and its invariant checks
//! - [`reconstruct`]: the async front door wiring the collaborator traits
//!   ([`ActionSource`], [`ParameterSource`]) to the engine
//!
//! # Failure semantics
//!
//! Reconstruction is fail-fast: any internal inconsistency (non-contiguous
//! poll indices, a root that disagrees with the recorded one, counts that
//! disagree with the contract) aborts with a [`ReplayError`]. The one
//! recoverable divergence is running without the coordinator's decryption
//! capability, which skips message-derived bookkeeping and flags the result
//! as a partial reconstruction.

#![forbid(unsafe_code)]

pub mod accumulator;
pub mod action;
pub mod engine;
pub mod error;
pub mod poll;
pub mod registry;
pub mod source;

pub use accumulator::Accumulator;
pub use action::{order_actions, Action, ActionKind, ActionTag};
pub use engine::{Reconstruction, ReplayEngine};
pub use error::{ReplayError, Result};
pub use poll::{KeyGeneration, PollState};
pub use registry::{RegistryState, SIGNUP_TREE_DEPTH};
pub use source::{reconstruct, ActionSource, ParameterSource, SourceError};
