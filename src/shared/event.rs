//! Realtime Event System
//!
//! Defines the mutation events broadcast to room members and the room naming
//! scheme. Events are the remote mirror of local mutations: the bridge turns
//! each one into the same store operation the optimistic path uses, so
//! duplicated or echoed delivery is harmless.

use crate::shared::comment::Comment;
use crate::shared::post::Post;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A logical broadcast group a client joins while the matching view is
/// mounted. Joining and leaving are explicit, idempotent operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Room {
    /// The post list view
    PostList,
    /// A single post's detail view
    PostDetail(Uuid),
}

impl Room {
    /// Stable channel name for this room
    pub fn channel_name(&self) -> String {
        match self {
            Room::PostList => "posts".to_string(),
            Room::PostDetail(id) => format!("post:{}", id),
        }
    }
}

impl std::fmt::Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.channel_name())
    }
}

/// Mutation event delivered to room members.
///
/// Delivery is assumed at-least-once; every event may arrive twice or after
/// the local optimistic copy of the same action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeEvent {
    /// A post was created
    NewPost { post: Post },
    /// A post changed (edit, vote counts, pin/lock toggles)
    PostUpdated { post: Post },
    /// A post was deleted
    PostDeleted { id: Uuid },
    /// A comment was added to a post
    NewComment { post_id: Uuid, comment: Comment },
    /// A comment was deleted
    CommentDeleted { post_id: Uuid, comment_id: Uuid },
}

impl RealtimeEvent {
    pub fn new_post(post: Post) -> Self {
        Self::NewPost { post }
    }

    pub fn post_updated(post: Post) -> Self {
        Self::PostUpdated { post }
    }

    pub fn post_deleted(id: Uuid) -> Self {
        Self::PostDeleted { id }
    }

    pub fn new_comment(post_id: Uuid, comment: Comment) -> Self {
        Self::NewComment { post_id, comment }
    }

    pub fn comment_deleted(post_id: Uuid, comment_id: Uuid) -> Self {
        Self::CommentDeleted {
            post_id,
            comment_id,
        }
    }

    /// Wire name of this event
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewPost { .. } => "new_post",
            Self::PostUpdated { .. } => "post_updated",
            Self::PostDeleted { .. } => "post_deleted",
            Self::NewComment { .. } => "new_comment",
            Self::CommentDeleted { .. } => "comment_deleted",
        }
    }

    /// The room this event is scoped to
    pub fn room(&self) -> Room {
        match self {
            Self::NewPost { .. } | Self::PostUpdated { .. } | Self::PostDeleted { .. } => {
                Room::PostList
            }
            Self::NewComment { post_id, .. } => Room::PostDetail(*post_id),
            Self::CommentDeleted { post_id, .. } => Room::PostDetail(*post_id),
        }
    }
}
