//! Event Broadcasting
//!
//! Events are fanned out over `tokio::sync::broadcast`, a multi-producer,
//! multi-consumer channel; every subscriber receives a copy of each
//! envelope. Room membership is tracked separately so joining and leaving
//! stay idempotent under rapid navigation.

use crate::shared::event::{RealtimeEvent, Room};
use std::collections::HashSet;
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Membership in logical broadcast rooms.
///
/// Both operations are idempotent: joining a room twice is the same as
/// joining it once, and leaving a room the client is not in is a no-op.
pub trait RoomChannel: Send + Sync {
    /// Join a room. Safe to call repeatedly.
    fn join(&self, room: &Room);
    /// Leave a room. Safe to call repeatedly.
    fn leave(&self, room: &Room);
    /// Whether the client is currently a member of the room.
    fn is_member(&self, room: &Room) -> bool;
}

/// An event paired with the room it was published to
#[derive(Debug, Clone)]
pub struct RoomEnvelope {
    pub room: Room,
    pub event: RealtimeEvent,
}

/// In-process broadcast hub.
///
/// Carries every published envelope to every subscriber; receivers drop
/// envelopes for rooms they have not joined. This is the seam the real
/// transport plugs into, and what the tests drive.
#[derive(Debug)]
pub struct BroadcastHub {
    tx: broadcast::Sender<RoomEnvelope>,
    joined: Mutex<HashSet<Room>>,
}

impl BroadcastHub {
    /// Create a hub with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            joined: Mutex::new(HashSet::new()),
        }
    }

    /// Publish an event to a room.
    ///
    /// Returns the number of active subscribers that received the envelope
    /// (0 when nobody is listening, which is not an error).
    pub fn publish(&self, room: Room, event: RealtimeEvent) -> usize {
        let name = event.name();
        match self.tx.send(RoomEnvelope { room, event }) {
            Ok(subscriber_count) => {
                tracing::debug!(room = %room, event = name, subscriber_count, "event published");
                subscriber_count
            }
            Err(_) => {
                tracing::debug!(room = %room, event = name, "no subscribers for event");
                0
            }
        }
    }

    /// Subscribe to the raw envelope stream
    pub fn subscribe(&self) -> broadcast::Receiver<RoomEnvelope> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(256)
    }
}

impl RoomChannel for BroadcastHub {
    fn join(&self, room: &Room) {
        let mut joined = self.joined.lock().expect("room set poisoned");
        if joined.insert(*room) {
            tracing::info!(room = %room, "joined room");
        } else {
            tracing::debug!(room = %room, "already in room, join ignored");
        }
    }

    fn leave(&self, room: &Room) {
        let mut joined = self.joined.lock().expect("room set poisoned");
        if joined.remove(room) {
            tracing::info!(room = %room, "left room");
        } else {
            tracing::debug!(room = %room, "not in room, leave ignored");
        }
    }

    fn is_member(&self, room: &Room) -> bool {
        self.joined.lock().expect("room set poisoned").contains(room)
    }
}
