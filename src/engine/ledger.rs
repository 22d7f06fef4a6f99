//! Vote Ledger
//!
//! The pure update function applied when a vote mutation arrives, local or
//! remote. Casting the same direction again cancels the vote; casting the
//! opposite direction replaces it in one transition, netting out the old
//! vote before applying the new one. Repeated application from any starting
//! state converges to the aggregate the server computes independently.
//!
//! When an authoritative aggregate arrives (API response or broadcast), the
//! tally is replaced wholesale rather than adjusted incrementally, so missed
//! or reordered events cannot cause drift.

use crate::shared::post::{VoteDirection, VoteReceipt, VoteState, VoteTally};

/// Result of applying a vote request to the viewer's current vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    /// The viewer's vote after the transition
    pub next: VoteState,
    /// Net score change
    pub score_delta: i64,
    /// Upvote count change
    pub upvote_delta: i64,
    /// Downvote count change
    pub downvote_delta: i64,
}

/// Compute the transition for a vote request against the current vote.
///
/// Pure function with no side effects; the caller applies the deltas.
pub fn apply_vote(current: VoteState, requested: VoteDirection) -> VoteOutcome {
    // Net out the existing vote first.
    let (mut up, mut down) = match current {
        VoteState::Up => (-1i64, 0i64),
        VoteState::Down => (0, -1),
        VoteState::None => (0, 0),
    };

    let requested_state = VoteState::from(requested);
    let next = if requested_state == current {
        // Toggle off
        VoteState::None
    } else {
        match requested {
            VoteDirection::Up => up += 1,
            VoteDirection::Down => down += 1,
        }
        requested_state
    };

    VoteOutcome {
        next,
        score_delta: up - down,
        upvote_delta: up,
        downvote_delta: down,
    }
}

impl VoteTally {
    /// Apply a vote transition to this aggregate.
    ///
    /// Counts saturate at zero instead of underflowing; a tally that would
    /// go negative indicates a stale aggregate, which the next authoritative
    /// replacement corrects.
    pub fn apply(&mut self, outcome: &VoteOutcome) {
        self.score += outcome.score_delta;
        self.upvotes = add_signed(self.upvotes, outcome.upvote_delta);
        self.downvotes = add_signed(self.downvotes, outcome.downvote_delta);
        self.viewer_vote = outcome.next;
    }

    /// Replace this aggregate with the server's authoritative values.
    pub fn replace_from(&mut self, receipt: &VoteReceipt) {
        self.score = receipt.score;
        self.upvotes = receipt.upvotes;
        self.downvotes = receipt.downvotes;
        self.viewer_vote = receipt.viewer_vote;
    }

    /// Recompute what the aggregate would be starting from empty, given only
    /// the viewer's final vote. Used by tests to check convergence.
    pub fn from_viewer_vote(viewer_vote: VoteState) -> Self {
        match viewer_vote {
            VoteState::None => Self::default(),
            VoteState::Up => Self {
                score: 1,
                upvotes: 1,
                downvotes: 0,
                viewer_vote,
            },
            VoteState::Down => Self {
                score: -1,
                upvotes: 0,
                downvotes: 1,
                viewer_vote,
            },
        }
    }
}

fn add_signed(value: u64, delta: i64) -> u64 {
    if delta >= 0 {
        value.saturating_add(delta as u64)
    } else {
        value.saturating_sub(delta.unsigned_abs())
    }
}
