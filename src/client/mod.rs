//! API Client
//!
//! Async trait for the consumed HTTP API plus the reqwest implementation.

/// Discussion API trait and HTTP client
pub mod api;

pub use api::{DiscussionApi, HttpApi};
