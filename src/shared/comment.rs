//! Comment Data Structures
//!
//! Represents a comment in a post's thread. Comments carry no vote state.

use crate::shared::user::UserRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a comment on a post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    /// Unique comment ID
    pub id: Uuid,
    /// The post this comment belongs to
    pub post_id: Uuid,
    /// Comment author
    pub author: UserRef,
    /// Comment text
    pub body: String,
    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Build a speculative comment under a client-generated ID. The server
    /// response replaces it during reconciliation.
    pub fn optimistic(post_id: Uuid, author: UserRef, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            author,
            body: body.into(),
            created_at: Utc::now(),
        }
    }
}

/// Request to add a comment to a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCommentRequest {
    pub body: String,
}
