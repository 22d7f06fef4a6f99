//! Moderation Rules
//!
//! Pin and lock are two independent flags per post; all four combinations
//! are reachable. Flipping either is a moderator-only action that goes
//! through the standard optimistic mutation protocol. `locked` gates comment
//! creation for non-moderators; `pinned` affects presentation only, never
//! permissions.
//!
//! Capability checks live here and are evaluated at the mutation dispatch
//! boundary, not only in UI affordances, so a stale or tampered UI state
//! cannot bypass them.

use crate::shared::post::Post;
use crate::shared::user::Viewer;

/// Whether the viewer may perform moderator actions (pin/lock)
pub fn can_moderate(viewer: &Viewer) -> bool {
    viewer.is_moderator()
}

/// Whether the viewer may comment on this post.
///
/// A locked post accepts comments from moderators only. This is enforced
/// server-side as well; the engine mirrors it so a comment against a locked
/// post is refused before any optimistic apply.
pub fn can_comment(viewer: &Viewer, post: &Post) -> bool {
    !post.locked || viewer.is_moderator()
}

/// Flip the pin flag. Used for the optimistic apply; the server response is
/// authoritative.
pub fn toggle_pin(post: &mut Post) {
    post.pinned = !post.pinned;
}

/// Flip the lock flag. Used for the optimistic apply; the server response is
/// authoritative.
pub fn toggle_lock(post: &mut Post) {
    post.locked = !post.locked;
}
