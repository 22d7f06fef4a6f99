//! Shared Module
//!
//! Platform-agnostic types used across the engine and the API client:
//! domain entities, request/response DTOs, realtime events, the error
//! taxonomy, and configuration. All wire-facing types are serde-serializable.

/// User identity and roles
pub mod user;

/// Post entity, categories, vote aggregate, DTOs
pub mod post;

/// Comment entity and DTOs
pub mod comment;

/// Filter/sort projection vocabulary
pub mod filter;

/// Realtime event system and room naming
pub mod event;

/// Engine error taxonomy
pub mod error;

/// Engine configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use comment::{Comment, NewCommentRequest};
pub use config::{ConfigError, EngineConfig, EngineConfigBuilder};
pub use error::EngineError;
pub use event::{RealtimeEvent, Room};
pub use filter::{CategoryFilter, PostFilter, SortBy, SortOrder};
pub use post::{
    NewPostRequest, Post, PostCategory, PostDetail, UpdatePostRequest, VoteDirection, VoteReceipt,
    VoteState, VoteTally,
};
pub use user::{Role, UserRef, Viewer};
