//! Per-poll numeric parameters, as reported by the chain.
//!
//! These values come from the parameter-source collaborator and are used to
//! configure replay (tree depths, batch sizes) and to cross-validate its
//! outcome (counts). They never drive state transitions directly.

use serde::{Deserialize, Serialize};

/// Depths of the protocol's commitment trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDepths {
    /// Intermediate signup-tree depth used during tallying.
    pub int_signup: usize,
    /// Full message-tree depth; message roots are finalized here.
    pub message: usize,
    /// Sub-tree depth of the message accumulator.
    pub message_sub: usize,
    /// Per-ballot vote option tree depth.
    pub vote_option: usize,
}

/// Processing batch sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSizes {
    /// Messages processed per batch.
    pub message: u32,
    /// Ballots tallied per batch.
    pub tally: u32,
}

/// Upper bounds fixed at poll deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxValues {
    /// Maximum number of messages the poll accepts.
    pub max_messages: u64,
    /// Maximum number of vote options.
    pub max_vote_options: u64,
}

/// Everything a poll is parameterized by at deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollParams {
    /// Block timestamp of the poll deployment.
    pub deploy_time: u64,
    /// Voting duration in seconds.
    pub duration: u64,
    /// Commitment tree depths.
    pub tree_depths: TreeDepths,
    /// Processing batch sizes.
    pub batch_sizes: BatchSizes,
    /// Deployment-time upper bounds.
    pub max_values: MaxValues,
}

/// Authoritative counters reported by the poll contract, used only for
/// post-reconstruction cross-validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollCounts {
    /// Participants signed up by the close of the poll.
    pub num_signups: u64,
    /// Messages accepted by the poll.
    pub num_messages: u64,
}
