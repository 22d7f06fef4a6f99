//! Randomized vote sequences against the ledger invariants.

use campusboard::engine::apply_vote;
use campusboard::shared::post::{VoteDirection, VoteState, VoteTally};
use proptest::prelude::*;

fn direction() -> impl Strategy<Value = VoteDirection> {
    prop_oneof![Just(VoteDirection::Up), Just(VoteDirection::Down)]
}

proptest! {
    /// `score == upvotes - downvotes` holds after any vote sequence.
    #[test]
    fn score_matches_counts(sequence in prop::collection::vec(direction(), 0..32)) {
        let mut tally = VoteTally::default();
        for requested in sequence {
            tally.apply(&apply_vote(tally.viewer_vote, requested));
            prop_assert_eq!(
                tally.score,
                tally.upvotes as i64 - tally.downvotes as i64
            );
        }
    }

    /// A single voter starting from an empty tally always lands on the
    /// canonical aggregate for their final vote, whatever the path taken.
    #[test]
    fn sequence_converges_to_final_vote(sequence in prop::collection::vec(direction(), 0..32)) {
        let mut tally = VoteTally::default();
        for requested in sequence {
            tally.apply(&apply_vote(tally.viewer_vote, requested));
        }
        prop_assert_eq!(tally.clone(), VoteTally::from_viewer_vote(tally.viewer_vote));
    }

    /// Casting the same direction twice returns the tally to where it was.
    #[test]
    fn double_toggle_is_identity(
        prefix in prop::collection::vec(direction(), 0..8),
        requested in direction(),
    ) {
        let mut tally = VoteTally::default();
        for step in prefix {
            tally.apply(&apply_vote(tally.viewer_vote, step));
        }
        let before = tally.clone();
        tally.apply(&apply_vote(tally.viewer_vote, requested));
        tally.apply(&apply_vote(tally.viewer_vote, requested));
        prop_assert_eq!(tally, before);
    }

    /// The transition deltas always describe a legal single-voter move:
    /// each count changes by at most one, in opposite directions at most.
    #[test]
    fn deltas_are_bounded(current in prop_oneof![
        Just(VoteState::None),
        Just(VoteState::Up),
        Just(VoteState::Down),
    ], requested in direction()) {
        let outcome = apply_vote(current, requested);
        prop_assert!(outcome.upvote_delta.abs() <= 1);
        prop_assert!(outcome.downvote_delta.abs() <= 1);
        prop_assert_eq!(
            outcome.score_delta,
            outcome.upvote_delta - outcome.downvote_delta
        );
    }
}
