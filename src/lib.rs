//! CampusBoard - Community Discussion Engine
//!
//! CampusBoard is the client-side engine for a campus community board:
//! posts, comment threads, votes, and moderator pin/lock controls, kept
//! consistent across an HTTP request/response cycle and a push-based
//! realtime event channel.
//!
//! # Overview
//!
//! The hard problem this crate solves is reconciling optimistic local
//! mutations with asynchronous, possibly out-of-order, possibly duplicated
//! broadcast events - without flicker, duplication, or lost updates. The
//! approach is a single narrow mutation surface: every producer, whether
//! the local optimistic path or the remote event bridge, goes through the
//! same idempotent store operations.
//!
//! # Module Structure
//!
//! - **`shared`** - Platform-agnostic types
//!   - Post/comment/user entities and DTOs
//!   - Realtime events and room naming
//!   - Error taxonomy and configuration
//!
//! - **`engine`** - The discussion engine core
//!   - Collection stores with idempotent insert/replace/remove
//!   - Pure vote ledger (toggle semantics, delta netting)
//!   - Optimistic mutation coordinator (apply, call, reconcile or roll back)
//!   - Realtime event bridge and scoped room sessions
//!   - Moderation capability checks at the dispatch boundary
//!
//! - **`client`** - The consumed HTTP API
//!   - `DiscussionApi` async trait
//!   - reqwest-backed implementation with status-to-taxonomy mapping
//!
//! - **`realtime`** - The consumed push channel
//!   - `RoomChannel` membership trait
//!   - In-process broadcast hub for local fan-out and tests
//!
//! # Usage
//!
//! ```rust,no_run
//! use campusboard::client::HttpApi;
//! use campusboard::engine::Coordinator;
//! use campusboard::realtime::BroadcastHub;
//! use campusboard::shared::{EngineConfig, Role, UserRef, Viewer};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), campusboard::shared::EngineError> {
//! let config = EngineConfig::load().expect("config");
//! let api = Arc::new(HttpApi::new(config));
//! let hub = Arc::new(BroadcastHub::default());
//! let viewer = Viewer::new(UserRef::new(uuid::Uuid::new_v4(), "sam"), Role::Member);
//!
//! let mut engine = Coordinator::new(api, hub, viewer);
//! engine.mount_post_list().await?;
//! for post in engine.visible_posts() {
//!     println!("{} ({})", post.title, post.tally.score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency Model
//!
//! Single-threaded, event-driven: store and ledger functions are
//! synchronous `&mut` methods, so two mutations against the same entity
//! never interleave. The only suspension point is the coordinator's API
//! call, during which the UI already shows the optimistic state. No
//! ordering is assumed between the optimistic path and the broadcast echo
//! of the same action; the stores' idempotence is the correctness
//! mechanism, not ordering.
//!
//! # Error Handling
//!
//! Store and ledger functions never fail - unexpected inputs degrade to
//! no-ops. The coordinator is the only layer that surfaces errors
//! (`shared::EngineError`), and it always pairs one with a deterministic
//! rollback of the optimistic change.

/// Shared types and data structures
pub mod shared;

/// Discussion engine core
pub mod engine;

/// HTTP API client
pub mod client;

/// Realtime channel abstraction
pub mod realtime;
