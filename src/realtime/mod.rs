//! Realtime Channel
//!
//! The consumed push-channel seam: a `RoomChannel` the engine joins and
//! leaves, plus an in-process broadcast hub that implements it for local
//! fan-out and tests. The real transport (reconnects, backfill) lives
//! outside this crate and plugs into the same trait.

/// Room membership trait and the broadcast hub
pub mod hub;

pub use hub::{BroadcastHub, RoomChannel, RoomEnvelope};
