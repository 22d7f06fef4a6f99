//! User Identity Types
//!
//! The engine never authenticates anyone itself; it consumes a snapshot of
//! the signed-in user (id, username, role) supplied by the session provider
//! and uses it for capability checks at mutation dispatch.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lightweight reference to a user, embedded in posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRef {
    /// Unique user ID
    pub id: Uuid,
    /// Display username
    pub username: String,
}

impl UserRef {
    pub fn new(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

/// Role of the signed-in user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Ordinary community member
    #[default]
    Member,
    /// Moderator with pin/lock privileges
    Moderator,
}

/// Snapshot of the current viewer used for permission checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Viewer {
    /// The signed-in user
    pub user: UserRef,
    /// The user's role
    pub role: Role,
}

impl Viewer {
    pub fn new(user: UserRef, role: Role) -> Self {
        Self { user, role }
    }

    /// Whether this viewer holds moderator privileges
    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }
}
