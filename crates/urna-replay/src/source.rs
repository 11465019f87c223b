//! External collaborator interfaces and the reconstruction driver.
//!
//! The engine never talks to a ledger itself. Two collaborators supply
//! everything it needs: an [`ActionSource`] returning per-kind batches of
//! recorded actions, and a [`ParameterSource`] returning the authoritative
//! numeric parameters and counters. Both are async traits: fetching is the
//! only place reconstruction touches I/O, and per-kind queries are
//! independent, so [`reconstruct`] issues them concurrently and joins before
//! ordering. Replay itself stays synchronous and sequential.

use crate::action::{order_actions, Action, ActionTag};
use crate::engine::{Reconstruction, ReplayEngine};
use crate::error::{ReplayError, Result};
use crate::registry::SIGNUP_TREE_DEPTH;
use async_trait::async_trait;
use futures::future::try_join_all;
use thiserror::Error;
use tracing::info;
use urna_core::{Keypair, PollCounts, PollParams};

/// A collaborator failure. Retrying is the collaborator's own business; the
/// core abandons the run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    /// A per-kind log query failed.
    #[error("log fetch failed: {0}")]
    Fetch(String),
    /// A parameter query failed.
    #[error("parameter query failed: {0}")]
    Parameter(String),
}

/// Supplies recorded actions, one batch per kind.
///
/// Implementations must return *every* matching record in
/// `[from_block, present]`, ordered as emitted within the source. A silent
/// gap cannot be detected here and yields an under-reconstruction; only the
/// final root and count checks have a chance of catching it.
#[async_trait]
pub trait ActionSource {
    /// Fetch the batch for one action kind, from `from_block` onward.
    async fn actions(
        &self,
        kind: ActionTag,
        from_block: u64,
    ) -> std::result::Result<Vec<Action>, SourceError>;
}

/// Supplies authoritative chain values, used for configuration and
/// post-reconstruction cross-validation — never to drive replay.
#[async_trait]
pub trait ParameterSource {
    /// Depth of the shared signup tree as deployed on chain.
    async fn signup_tree_depth(&self) -> std::result::Result<usize, SourceError>;

    /// Number of polls deployed so far.
    async fn deployed_polls(&self) -> std::result::Result<usize, SourceError>;

    /// Deployment parameters of one poll.
    async fn poll_params(&self, poll: usize) -> std::result::Result<PollParams, SourceError>;

    /// Authoritative counters of one poll.
    async fn poll_counts(&self, poll: usize) -> std::result::Result<PollCounts, SourceError>;
}

/// Reconstruct the registry state with poll `target` hydrated.
///
/// The front door of the crate: validates the registry depth against the
/// chain, checks the target poll exists, fetches every per-kind batch
/// concurrently, orders them, replays, and cross-validates the outcome.
/// Passing `capability: None` yields a partial reconstruction (root
/// consistency without message content). All fatal conditions abort with the
/// specific [`ReplayError`]; no partial state is returned on failure.
pub async fn reconstruct<A, P>(
    actions: &A,
    parameters: &P,
    target: usize,
    capability: Option<Keypair>,
    from_block: u64,
) -> Result<Reconstruction>
where
    A: ActionSource + Sync,
    P: ParameterSource + Sync,
{
    let onchain = parameters.signup_tree_depth().await?;
    if onchain != SIGNUP_TREE_DEPTH {
        return Err(ReplayError::DepthMismatch { local: SIGNUP_TREE_DEPTH, onchain });
    }
    let deployed = parameters.deployed_polls().await?;
    if target >= deployed {
        return Err(ReplayError::MissingPoll(target));
    }
    let params = parameters.poll_params(target).await?;
    let counts = parameters.poll_counts(target).await?;

    let batches =
        try_join_all(ActionTag::ALL.iter().map(|tag| actions.actions(*tag, from_block))).await?;
    let ordered = order_actions(batches);
    info!(poll = target, total = ordered.len(), from_block, "replaying ordered actions");

    let mut engine = ReplayEngine::new(target, params, capability);
    for action in &ordered {
        engine.apply(action)?;
    }
    engine.finish(&counts)
}
