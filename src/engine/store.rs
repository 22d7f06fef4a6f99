//! Collection Stores
//!
//! The canonical in-memory lists used for rendering. Every mutation, whether
//! from the local optimistic path or from a remote broadcast, goes through
//! the three operations here, which are idempotent and safe under duplicate
//! or out-of-order delivery:
//!
//! - `insert_at_head` / `append` - no-op when the ID is already present or
//!   was previously removed
//! - `replace` - in-place update preserving position; no-op when absent
//!   (tolerates update-before-create races)
//! - `remove` - no-op when absent; removal is terminal
//!
//! Removal is terminal: the store remembers removed IDs, so a redelivered
//! create for a deleted entity stays gone. `replace_all` (full resync from
//! the server) clears that memory because the server list is authoritative.

use crate::shared::comment::Comment;
use crate::shared::filter::PostFilter;
use crate::shared::post::Post;
use std::collections::HashSet;
use uuid::Uuid;

/// Entities stored in a collection, keyed by UUID
pub trait Keyed {
    fn key(&self) -> Uuid;
}

impl Keyed for Post {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for Comment {
    fn key(&self) -> Uuid {
        self.id
    }
}

/// Ordered list of entities with an idempotent mutation surface
#[derive(Debug, Clone)]
pub struct CollectionStore<T: Keyed> {
    items: Vec<T>,
    removed: HashSet<Uuid>,
}

impl<T: Keyed> Default for CollectionStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed> CollectionStore<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            removed: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.items.iter().find(|item| item.key() == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.items.iter().any(|item| item.key() == id)
    }

    /// Prepend an entity unless its ID is already present or was removed.
    /// Returns whether the entity was inserted.
    pub fn insert_at_head(&mut self, item: T) -> bool {
        if !self.admit(&item) {
            return false;
        }
        self.items.insert(0, item);
        true
    }

    /// Append an entity unless its ID is already present or was removed.
    /// Returns whether the entity was inserted.
    pub fn append(&mut self, item: T) -> bool {
        if !self.admit(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Update an entity in place, preserving its position. Absent IDs are a
    /// no-op so an update arriving before its create cannot corrupt the
    /// list. Returns whether an entity was updated.
    pub fn replace(&mut self, id: Uuid, updater: impl FnOnce(&mut T)) -> bool {
        match self.items.iter_mut().find(|item| item.key() == id) {
            Some(item) => {
                updater(item);
                true
            }
            None => {
                tracing::debug!(%id, "replace for absent entity ignored");
                false
            }
        }
    }

    /// Remove an entity. Absent IDs are a no-op; removal is remembered so
    /// later events for this ID stay no-ops. Returns whether an entity was
    /// removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.key() != id);
        self.removed.insert(id);
        let removed = self.items.len() < before;
        if !removed {
            tracing::debug!(%id, "remove for absent entity ignored");
        }
        removed
    }

    /// Replace the whole list with a fresh authoritative copy, e.g. after a
    /// reconnect refresh. Clears the removed-ID memory.
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.removed.clear();
    }

    fn admit(&self, item: &T) -> bool {
        let id = item.key();
        if self.removed.contains(&id) {
            tracing::debug!(%id, "insert for removed entity ignored");
            return false;
        }
        if self.contains(id) {
            tracing::debug!(%id, "duplicate insert ignored");
            return false;
        }
        true
    }
}

impl CollectionStore<Post> {
    /// Pure projection of the list under a filter: pinned posts first, then
    /// the filter's sort key. Recomputed on every render; never a second
    /// mutable copy of the data.
    pub fn project(&self, filter: &PostFilter, viewer_id: Uuid) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self
            .items
            .iter()
            .filter(|post| filter.matches(post, viewer_id))
            .collect();
        posts.sort_by(|a, b| {
            b.pinned
                .cmp(&a.pinned)
                .then_with(|| filter.compare(a, b))
        });
        posts
    }
}

/// A mounted comment thread: the comment store scoped to one post's detail
/// view. Exists only while that view is mounted.
#[derive(Debug, Clone)]
pub struct CommentThread {
    /// The post this thread belongs to
    pub post_id: Uuid,
    /// The canonical comment list
    pub comments: CollectionStore<Comment>,
}

impl CommentThread {
    pub fn new(post_id: Uuid, comments: Vec<Comment>) -> Self {
        let mut store = CollectionStore::new();
        store.replace_all(comments);
        Self {
            post_id,
            comments: store,
        }
    }
}
