//! Discussion Engine Core
//!
//! The post/comment/vote data flow: canonical collection stores with an
//! idempotent mutation surface, the pure vote ledger, the optimistic
//! mutation coordinator, the realtime event bridge, and moderation rules.
//!
//! Local user actions and remote broadcast events funnel through the same
//! store operations, so state converges regardless of delivery order or
//! duplication.

/// Pure vote transition function and tally maintenance
pub mod ledger;

/// Idempotent collection stores for posts and comments
pub mod store;

/// Optimistic mutation coordinator
pub mod coordinator;

/// Realtime event bridge and room sessions
pub mod bridge;

/// Moderation rules and capability checks
pub mod moderation;

pub use bridge::RoomSession;
pub use coordinator::{Coordinator, MutationKind, MutationOutcome};
pub use ledger::{apply_vote, VoteOutcome};
pub use store::{CollectionStore, CommentThread, Keyed};
