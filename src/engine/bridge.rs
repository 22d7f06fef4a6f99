//! Realtime Event Bridge
//!
//! Translates inbound broadcast events into the same store operations the
//! optimistic path uses, so the stores have exactly one mutation surface
//! regardless of origin. The bridge never deduplicates its own echoed
//! events; store idempotence is the correctness mechanism.
//!
//! Room membership is held through `RoomSession`, a guard that joins on
//! construction and leaves on every exit path, including drops during error
//! unwinding.

use crate::engine::store::{CollectionStore, CommentThread};
use crate::realtime::RoomChannel;
use crate::shared::event::{RealtimeEvent, Room};
use crate::shared::post::Post;
use std::sync::Arc;

/// Scoped room membership. Joins the room when opened; leaving happens at
/// most once, on `release` or on drop, whichever comes first.
pub struct RoomSession {
    room: Room,
    channel: Arc<dyn RoomChannel>,
    released: bool,
}

impl std::fmt::Debug for RoomSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomSession")
            .field("room", &self.room)
            .field("released", &self.released)
            .finish()
    }
}

impl RoomSession {
    /// Join `room` and return the guard holding the membership
    pub fn open(channel: Arc<dyn RoomChannel>, room: Room) -> Self {
        channel.join(&room);
        Self {
            room,
            channel,
            released: false,
        }
    }

    /// The room this session is scoped to
    pub fn room(&self) -> Room {
        self.room
    }

    /// Leave the room. Idempotent.
    pub fn release(&mut self) {
        if !self.released {
            self.channel.leave(&self.room);
            self.released = true;
        }
    }
}

impl Drop for RoomSession {
    fn drop(&mut self) {
        self.release();
    }
}

/// Apply a broadcast event to the stores.
///
/// `thread` is the mounted comment thread, if any; comment events for other
/// posts are discarded. Post events touch the post list; comment events also
/// adjust the parent post's comment count when they actually land, so list
/// badges stay consistent.
///
/// Synchronous and non-suspending: an event is fully applied before the next
/// one can run.
pub fn apply_event(
    posts: &mut CollectionStore<Post>,
    thread: Option<&mut CommentThread>,
    event: &RealtimeEvent,
) {
    match event {
        RealtimeEvent::NewPost { post } => {
            if posts.insert_at_head(post.clone()) {
                tracing::debug!(post_id = %post.id, "remote post inserted");
            }
        }
        RealtimeEvent::PostUpdated { post } => {
            let updated = post.clone();
            posts.replace(post.id, move |current| *current = updated);
        }
        RealtimeEvent::PostDeleted { id } => {
            posts.remove(*id);
        }
        RealtimeEvent::NewComment { post_id, comment } => {
            let Some(thread) = thread else {
                tracing::debug!(%post_id, "comment event with no mounted thread dropped");
                return;
            };
            if thread.post_id != *post_id {
                tracing::debug!(%post_id, mounted = %thread.post_id, "comment event for other thread dropped");
                return;
            }
            if thread.comments.append(comment.clone()) {
                posts.replace(*post_id, |post| {
                    post.comment_count = post.comment_count.saturating_add(1);
                });
            }
        }
        RealtimeEvent::CommentDeleted {
            post_id,
            comment_id,
        } => {
            let Some(thread) = thread else {
                tracing::debug!(%post_id, "comment event with no mounted thread dropped");
                return;
            };
            if thread.post_id != *post_id {
                return;
            }
            if thread.comments.remove(*comment_id) {
                posts.replace(*post_id, |post| {
                    post.comment_count = post.comment_count.saturating_sub(1);
                });
            }
        }
    }
}
