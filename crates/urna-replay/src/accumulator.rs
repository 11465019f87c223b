//! Incremental Merkle accumulator with two-phase merging.
//!
//! The on-chain queues accept leaves cheaply and defer tree construction:
//! appended leaves are first consolidated into fixed-size *sub-roots*
//! ([`Accumulator::merge_sub_roots`]), and a full root at a chosen depth is
//! finalized over the sub-roots afterwards ([`Accumulator::merge`]). Replay
//! mirrors that two-phase shape exactly so that merge actions recorded on
//! chain can be applied one-to-one.
//!
//! Padding uses per-level zero hashes derived from a fixed domain string, so
//! a partially filled tree has a well-defined root.

use crate::error::{ReplayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use urna_core::hash::hash_fields;
use urna_core::Field;

const DOMAIN_NODE: &str = "urna.accumulator.node";
const DOMAIN_ZERO_LEAF: &str = "urna.accumulator.zero-leaf";

/// Maximum supported tree depth.
pub const MAX_DEPTH: usize = 32;

/// An append-only Merkle accumulator.
///
/// Leaves are appended in arrival order and never removed. Finalized roots
/// are invalidated by any subsequent append (they committed to a smaller
/// leaf set); sub-roots of already-consolidated leaves stay valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accumulator {
    sub_depth: usize,
    leaves: Vec<Field>,
    /// Leaves already covered by a sub-root.
    consolidated: usize,
    sub_roots: Vec<Field>,
    /// Finalized roots by depth, for the current leaf set.
    roots: BTreeMap<usize, Field>,
}

impl Accumulator {
    /// Create an accumulator whose sub-trees hold `2^sub_depth` leaves.
    ///
    /// # Panics
    /// Panics if `sub_depth` exceeds [`MAX_DEPTH`].
    #[must_use]
    pub fn new(sub_depth: usize) -> Self {
        assert!(
            sub_depth <= MAX_DEPTH,
            "sub_depth {sub_depth} exceeds MAX_DEPTH {MAX_DEPTH}"
        );
        Self {
            sub_depth,
            leaves: Vec::new(),
            consolidated: 0,
            sub_roots: Vec::new(),
            roots: BTreeMap::new(),
        }
    }

    /// Append a leaf. Invalidates any finalized roots.
    pub fn append(&mut self, leaf: Field) {
        self.leaves.push(leaf);
        self.roots.clear();
    }

    /// Consolidate pending leaves into sub-roots.
    ///
    /// Each operation consolidates one sub-tree's worth of pending leaves
    /// (the final sub-tree may be partial and is zero-padded). `num_ops`
    /// bounds the operations consumed; `0` consolidates everything
    /// outstanding, matching the on-chain queue's convention. Calling with no
    /// pending leaves is a no-op, so replaying a duplicate merge action is
    /// harmless.
    pub fn merge_sub_roots(&mut self, num_ops: usize) {
        let capacity = 1usize << self.sub_depth;
        let mut ops = 0;
        while self.consolidated < self.leaves.len() && (num_ops == 0 || ops < num_ops) {
            let end = usize::min(self.consolidated + capacity, self.leaves.len());
            let root = Self::sub_tree_root(self.sub_depth, &self.leaves[self.consolidated..end]);
            self.sub_roots.push(root);
            self.consolidated = end;
            ops += 1;
        }
    }

    /// Finalize a root at `depth` over the current sub-roots.
    ///
    /// Requires every appended leaf to be consolidated first
    /// ([`ReplayError::SubRootsPending`] otherwise) and `depth` to be large
    /// enough for the leaf set ([`ReplayError::DepthTooSmall`]). Idempotent:
    /// merging again at the same depth with an unchanged leaf set returns the
    /// same root.
    pub fn merge(&mut self, depth: usize) -> Result<Field> {
        let pending = self.leaves.len() - self.consolidated;
        if pending > 0 {
            return Err(ReplayError::SubRootsPending { pending });
        }
        if let Some(root) = self.roots.get(&depth) {
            return Ok(*root);
        }
        if depth < self.sub_depth || self.sub_roots.len() as u64 > Self::capacity(depth - self.sub_depth) {
            return Err(ReplayError::DepthTooSmall {
                depth,
                leaves: self.leaves.len(),
            });
        }

        let mut nodes = if self.sub_roots.is_empty() {
            vec![Self::zero_at(self.sub_depth)]
        } else {
            self.sub_roots.clone()
        };
        for level in self.sub_depth..depth {
            if nodes.len() % 2 == 1 {
                nodes.push(Self::zero_at(level));
            }
            nodes = nodes
                .chunks(2)
                .map(|pair| Self::combine(pair[0], pair[1]))
                .collect();
        }
        // The capacity check above guarantees the fold reaches a single node.
        let root = nodes[0];
        self.roots.insert(depth, root);
        Ok(root)
    }

    /// The finalized root at `depth`, if [`Accumulator::merge`] was called at
    /// that depth for the current leaf set.
    pub fn root_at(&self, depth: usize) -> Result<Field> {
        self.roots
            .get(&depth)
            .copied()
            .ok_or(ReplayError::NotMerged(depth))
    }

    /// Leaves appended so far.
    #[must_use]
    pub fn num_leaves(&self) -> usize {
        self.leaves.len()
    }

    /// Whether leaves still await sub-root consolidation.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.consolidated < self.leaves.len()
    }

    /// Sub-roots consolidated so far.
    #[must_use]
    pub fn sub_roots(&self) -> &[Field] {
        &self.sub_roots
    }

    fn capacity(levels: usize) -> u64 {
        u32::try_from(levels)
            .ok()
            .and_then(|l| 1u64.checked_shl(l))
            .unwrap_or(u64::MAX)
    }

    fn combine(left: Field, right: Field) -> Field {
        hash_fields(DOMAIN_NODE, &[left, right])
    }

    /// Root of an all-zero sub-tree of height `level`.
    fn zero_at(level: usize) -> Field {
        let mut node = hash_fields(DOMAIN_ZERO_LEAF, &[]);
        for _ in 0..level {
            node = Self::combine(node, node);
        }
        node
    }

    /// Root of one zero-padded sub-tree over `batch` (at most `2^sub_depth`
    /// leaves).
    fn sub_tree_root(sub_depth: usize, batch: &[Field]) -> Field {
        debug_assert!(!batch.is_empty() && batch.len() <= 1 << sub_depth);
        let mut nodes = batch.to_vec();
        for level in 0..sub_depth {
            if nodes.len() % 2 == 1 {
                nodes.push(Self::zero_at(level));
            }
            nodes = nodes
                .chunks(2)
                .map(|pair| Self::combine(pair[0], pair[1]))
                .collect();
        }
        nodes[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: u64) -> Vec<Field> {
        (0..n).map(Field::from_u64).collect()
    }

    fn filled(sub_depth: usize, n: u64) -> Accumulator {
        let mut acc = Accumulator::new(sub_depth);
        for leaf in leaves(n) {
            acc.append(leaf);
        }
        acc
    }

    #[test]
    fn round_trip_produces_a_root() {
        let mut acc = filled(2, 4);
        acc.merge_sub_roots(0);
        let root = acc.merge(4).unwrap();
        assert_eq!(acc.root_at(4).unwrap(), root);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut acc = filled(2, 5);
        acc.merge_sub_roots(0);
        let first = acc.merge(4).unwrap();
        let second = acc.merge(4).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn merge_sub_roots_is_idempotent_when_nothing_pending() {
        let mut acc = filled(2, 4);
        acc.merge_sub_roots(0);
        let before = acc.sub_roots().to_vec();
        acc.merge_sub_roots(0);
        assert_eq!(acc.sub_roots(), before.as_slice());
    }

    #[test]
    fn num_ops_bounds_consolidation() {
        // 9 leaves with sub-trees of 4 need three operations.
        let mut acc = filled(2, 9);
        acc.merge_sub_roots(1);
        assert_eq!(acc.sub_roots().len(), 1);
        assert!(acc.has_pending());
        acc.merge_sub_roots(2);
        assert_eq!(acc.sub_roots().len(), 3);
        assert!(!acc.has_pending());
    }

    #[test]
    fn merge_with_pending_leaves_fails() {
        let mut acc = filled(2, 4);
        assert_eq!(acc.merge(4), Err(ReplayError::SubRootsPending { pending: 4 }));
    }

    #[test]
    fn depth_too_small_is_rejected() {
        let mut acc = filled(1, 8);
        acc.merge_sub_roots(0);
        assert_eq!(acc.merge(2), Err(ReplayError::DepthTooSmall { depth: 2, leaves: 8 }));
        assert!(acc.merge(3).is_ok());
    }

    #[test]
    fn depth_below_sub_depth_is_rejected() {
        let mut acc = filled(3, 1);
        acc.merge_sub_roots(0);
        assert_eq!(acc.merge(2), Err(ReplayError::DepthTooSmall { depth: 2, leaves: 1 }));
    }

    #[test]
    fn root_before_merge_is_not_merged() {
        let acc = filled(2, 4);
        assert_eq!(acc.root_at(4), Err(ReplayError::NotMerged(4)));
    }

    #[test]
    fn append_after_merge_invalidates_roots() {
        let mut acc = filled(2, 4);
        acc.merge_sub_roots(0);
        let old = acc.merge(4).unwrap();
        acc.append(Field::from_u64(99));
        assert_eq!(acc.root_at(4), Err(ReplayError::NotMerged(4)));
        acc.merge_sub_roots(0);
        assert_ne!(acc.merge(4).unwrap(), old);
    }

    #[test]
    fn empty_accumulator_merges_to_zero_tree() {
        let mut a = Accumulator::new(2);
        let mut b = Accumulator::new(2);
        a.merge_sub_roots(0);
        b.merge_sub_roots(0);
        assert_eq!(a.merge(4).unwrap(), b.merge(4).unwrap());
    }

    #[test]
    fn padding_distinguishes_partial_batches() {
        // A zero-padded partial batch must not collide with the same batch
        // plus an explicitly appended all-zero leaf.
        let mut partial = filled(2, 3);
        partial.merge_sub_roots(0);
        let mut explicit = filled(2, 3);
        explicit.append(Field::ZERO);
        explicit.merge_sub_roots(0);
        assert_ne!(partial.merge(4).unwrap(), explicit.merge(4).unwrap());
    }

    #[test]
    fn batched_consolidation_matches_single_pass() {
        let mut stepwise = filled(2, 9);
        stepwise.merge_sub_roots(1);
        stepwise.merge_sub_roots(0);
        let mut single = filled(2, 9);
        single.merge_sub_roots(0);
        assert_eq!(stepwise.merge(5).unwrap(), single.merge(5).unwrap());
    }
}
