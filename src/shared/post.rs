//! Post Data Structures
//!
//! Represents a community post together with its vote aggregate, plus the
//! request/response DTOs exchanged with the HTTP API.

use crate::shared::user::UserRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category a post is filed under
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostCategory {
    #[default]
    General,
    Housing,
    Roommates,
    University,
    Tips,
    Questions,
}

/// The viewer's own vote on a post
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VoteState {
    /// No active vote
    #[default]
    None,
    /// Upvoted
    Up,
    /// Downvoted
    Down,
}

/// A vote the user can cast (there is no explicit "remove" direction;
/// repeating the current direction cancels it)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VoteDirection {
    Up,
    Down,
}

impl From<VoteDirection> for VoteState {
    fn from(direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::Up => VoteState::Up,
            VoteDirection::Down => VoteState::Down,
        }
    }
}

/// Vote aggregate for a post, including the viewer's own vote.
///
/// Invariant: `score == upvotes as i64 - downvotes as i64`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct VoteTally {
    /// Net score (upvotes minus downvotes)
    pub score: i64,
    /// Total upvotes
    pub upvotes: u64,
    /// Total downvotes
    pub downvotes: u64,
    /// The current viewer's vote
    pub viewer_vote: VoteState,
}

/// Represents a community post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    /// Unique post ID
    pub id: Uuid,
    /// Post author
    pub author: UserRef,
    /// Title
    pub title: String,
    /// Body text
    pub body: String,
    /// Category
    pub category: PostCategory,
    /// When the post was created
    pub created_at: DateTime<Utc>,
    /// Number of views
    pub view_count: u64,
    /// Number of comments
    pub comment_count: u64,
    /// Whether a moderator pinned this post
    pub pinned: bool,
    /// Whether a moderator locked this post
    pub locked: bool,
    /// Vote aggregate
    pub tally: VoteTally,
}

impl Post {
    /// Build a speculative post under a client-generated ID. The server
    /// response replaces it wholesale during reconciliation.
    pub fn optimistic(author: UserRef, draft: &NewPostRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            title: draft.title.clone(),
            body: draft.body.clone(),
            category: draft.category,
            created_at: Utc::now(),
            view_count: 0,
            comment_count: 0,
            pinned: false,
            locked: false,
            tally: VoteTally::default(),
        }
    }
}

/// Request to create a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPostRequest {
    pub title: String,
    pub body: String,
    pub category: PostCategory,
}

/// Request to edit a post; absent fields are left unchanged
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Request body for casting a vote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    pub direction: VoteDirection,
}

/// Authoritative vote aggregate returned by the server after a vote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteReceipt {
    pub score: i64,
    pub upvotes: u64,
    pub downvotes: u64,
    pub viewer_vote: VoteState,
}

/// A post together with its comment thread, as returned by the detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<crate::shared::comment::Comment>,
}
