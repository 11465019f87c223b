//! Error types for reconstruction.

use crate::source::SourceError;
use thiserror::Error;
use urna_core::Field;

/// Fatal reconstruction failures.
///
/// Every variant aborts the run: the engine never returns a possibly
/// inconsistent state as success. The one recoverable divergence — skipping
/// message-derived bookkeeping for lack of the coordinator capability — is
/// not an error; it is surfaced as [`crate::engine::Reconstruction::partial`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    /// The requested target poll was never deployed.
    #[error("poll {0} does not exist among the deployed polls")]
    MissingPoll(usize),

    /// A poll deployment arrived out of order.
    #[error("poll deployed with index {index} but {deployed} polls exist; indices must be contiguous")]
    NonContiguousPoll {
        /// Index carried by the deployment action.
        index: usize,
        /// Polls deployed before it.
        deployed: usize,
    },

    /// An action touched the target poll before its deployment action.
    #[error("action for poll {0} precedes its deployment in the ordered log")]
    PollNotDeployed(usize),

    /// A root was requested at a depth that was never merged.
    #[error("no root finalized at depth {0} for the current leaf set")]
    NotMerged(usize),

    /// A full merge was requested while leaves still await sub-root
    /// consolidation.
    #[error("{pending} appended leaves have not been consolidated into sub-roots")]
    SubRootsPending {
        /// Leaves appended but not yet covered by a sub-root.
        pending: usize,
    },

    /// A full merge was requested at a depth too small for the leaf set.
    #[error("depth {depth} cannot hold {leaves} leaves")]
    DepthTooSmall {
        /// Requested tree depth.
        depth: usize,
        /// Leaves appended so far.
        leaves: usize,
    },

    /// A finalized root disagrees with the externally observed root.
    /// Signals log corruption or a reconstruction defect.
    #[error("merged root {computed} does not match the recorded root {expected}")]
    RootMismatch {
        /// Root this reconstruction computed.
        computed: Field,
        /// Root recorded on chain.
        expected: Field,
    },

    /// Reconstructed counts disagree with the contract's counters.
    #[error("reconstructed {reconstructed} messages but the contract reports {expected}")]
    CountMismatch {
        /// Messages this reconstruction collected.
        reconstructed: u64,
        /// Authoritative count from the parameter source.
        expected: u64,
    },

    /// The registry tree depth disagrees with the on-chain value.
    #[error("registry tree depth {local} disagrees with the on-chain depth {onchain}")]
    DepthMismatch {
        /// Depth this implementation is built for.
        local: usize,
        /// Depth reported by the chain.
        onchain: usize,
    },

    /// A collaborator failed; the whole reconstruction is abandoned.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Result alias for reconstruction operations.
pub type Result<T> = std::result::Result<T, ReplayError>;
