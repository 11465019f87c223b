//! Property-based tests for the action orderer.
//!
//! The merged sequence must be a stable total order by `(block, index)` and
//! must not depend on how the input happened to be batched per kind.

use proptest::prelude::*;
use std::collections::BTreeMap;
use urna_core::{Field, Message};
use urna_replay::{order_actions, Action, ActionKind, ActionTag};

/// Actions with unique ordering keys (the upstream log guarantee) across a
/// handful of kinds.
fn arb_actions() -> impl Strategy<Value = Vec<Action>> {
    prop::collection::vec((0u8..4, 0u64..20), 0..48).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (kind_sel, block))| {
                let kind = match kind_sel {
                    0 => ActionKind::MergeSignupSubRoots { poll: 0, num_ops: 1 },
                    1 => ActionKind::MergeSignupTree { poll: 0 },
                    2 => ActionKind::TopUp {
                        message: Message::new(2, vec![Field::from_u64(i as u64)]),
                    },
                    _ => ActionKind::MergeMessageSubRoots { num_ops: 1 },
                };
                // The enumeration index keeps every (block, index) key unique.
                Action { block, index: i as u64, kind }
            })
            .collect()
    })
}

fn group_by_kind(actions: &[Action]) -> Vec<Vec<Action>> {
    let mut groups: BTreeMap<ActionTag, Vec<Action>> = BTreeMap::new();
    for action in actions {
        groups.entry(action.kind.tag()).or_default().push(action.clone());
    }
    groups.into_values().collect()
}

proptest! {
    /// The merged order does not depend on how actions were batched.
    #[test]
    fn batching_is_irrelevant(actions in arb_actions()) {
        let single = order_actions(vec![actions.clone()]);
        let by_kind = order_actions(group_by_kind(&actions));
        let mut reversed_groups = group_by_kind(&actions);
        reversed_groups.reverse();
        let reversed = order_actions(reversed_groups);

        prop_assert_eq!(&single, &by_kind);
        prop_assert_eq!(&single, &reversed);
    }

    /// The output is sorted by `(block, index)` and is a permutation of the
    /// input: nothing dropped, nothing duplicated.
    #[test]
    fn output_is_a_sorted_permutation(actions in arb_actions()) {
        let ordered = order_actions(vec![actions.clone()]);

        prop_assert_eq!(ordered.len(), actions.len());
        for pair in ordered.windows(2) {
            prop_assert!(pair[0].ordinal() <= pair[1].ordinal());
        }

        let mut expected = actions;
        expected.sort_by_key(Action::ordinal);
        prop_assert_eq!(ordered, expected);
    }
}
