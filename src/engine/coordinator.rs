//! Optimistic Mutation Coordinator
//!
//! Wraps every user-triggered mutation in the same protocol: apply the
//! optimistic next state through the pure store/ledger functions, issue the
//! API call, then reconcile with the authoritative response or roll back to
//! the pre-mutation snapshot. The UI reads the stores and never waits for
//! the network.
//!
//! Reconciliation never trusts the optimistic guess for server-owned fields
//! (vote aggregates, assigned IDs, timestamps): it removes the speculative
//! state and applies the response payload, which stays correct whichever of
//! the response and the broadcast echo arrives first.
//!
//! A per-entity in-flight guard suppresses identical re-dispatch while a
//! mutation is pending, so a burst of clicks cannot produce out-of-order
//! server writes.

use crate::client::DiscussionApi;
use crate::engine::bridge::{self, RoomSession};
use crate::engine::ledger::apply_vote;
use crate::engine::moderation;
use crate::engine::store::{CollectionStore, CommentThread};
use crate::realtime::RoomChannel;
use crate::shared::comment::{Comment, NewCommentRequest};
use crate::shared::error::EngineError;
use crate::shared::event::{RealtimeEvent, Room};
use crate::shared::filter::PostFilter;
use crate::shared::post::{NewPostRequest, Post, UpdatePostRequest, VoteDirection};
use crate::shared::user::Viewer;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Kind of mutation, used to key the in-flight guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Vote,
    CreatePost,
    UpdatePost,
    DeletePost,
    CreateComment,
    DeleteComment,
    TogglePin,
    ToggleLock,
}

/// How a dispatched mutation was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The mutation ran through the optimistic protocol
    Applied,
    /// An identical mutation was already in flight; nothing was done.
    ///
    /// The coordinator's own methods resolve each mutation before the next
    /// one can start, so this arises only when an embedding layer decouples
    /// dispatch from resolution, such as spawning mutations onto tasks and
    /// re-dispatching while one is pending.
    Suppressed,
}

/// Tracks `(kind, entity)` pairs with a pending API call
#[derive(Debug, Default)]
struct InFlight {
    pending: HashSet<(MutationKind, Uuid)>,
}

impl InFlight {
    fn try_begin(&mut self, kind: MutationKind, id: Uuid) -> bool {
        self.pending.insert((kind, id))
    }

    fn finish(&mut self, kind: MutationKind, id: Uuid) {
        self.pending.remove(&(kind, id));
    }
}

/// The discussion engine's mutation coordinator.
///
/// Owns the canonical post list, the mounted comment thread (if a detail
/// view is open), the room sessions, and the in-flight guard. All mutation
/// entry points are `&mut self`, so store application is linearized; the
/// only suspension point is the API call in the middle of each protocol.
pub struct Coordinator {
    api: Arc<dyn DiscussionApi>,
    channel: Arc<dyn RoomChannel>,
    viewer: Viewer,
    filter: PostFilter,
    posts: CollectionStore<Post>,
    thread: Option<CommentThread>,
    list_session: Option<RoomSession>,
    detail_session: Option<RoomSession>,
    in_flight: InFlight,
}

impl Coordinator {
    pub fn new(api: Arc<dyn DiscussionApi>, channel: Arc<dyn RoomChannel>, viewer: Viewer) -> Self {
        Self {
            api,
            channel,
            viewer,
            filter: PostFilter::default(),
            posts: CollectionStore::new(),
            thread: None,
            list_session: None,
            detail_session: None,
            in_flight: InFlight::default(),
        }
    }

    /// The canonical post list
    pub fn posts(&self) -> &CollectionStore<Post> {
        &self.posts
    }

    /// The mounted comment thread, if a detail view is open
    pub fn thread(&self) -> Option<&CommentThread> {
        self.thread.as_ref()
    }

    /// The current viewer
    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// The active filter
    pub fn filter(&self) -> &PostFilter {
        &self.filter
    }

    /// Set the active filter. Takes effect on the next projection and the
    /// next refresh.
    pub fn set_filter(&mut self, filter: PostFilter) {
        self.filter = filter;
    }

    /// Posts visible under the active filter, pinned first. Pure projection
    /// over the canonical list; recomputed on every call.
    pub fn visible_posts(&self) -> Vec<&Post> {
        self.posts.project(&self.filter, self.viewer.user.id)
    }

    // ---- view lifecycle ----

    /// Mount the post list view: join its room and load the list.
    /// Safe to call repeatedly.
    pub async fn mount_post_list(&mut self) -> Result<(), EngineError> {
        if self.list_session.is_none() {
            self.list_session = Some(RoomSession::open(self.channel.clone(), Room::PostList));
        }
        self.refresh_posts().await
    }

    /// Unmount the post list view, leaving its room. Further post-list
    /// events are discarded.
    pub fn unmount_post_list(&mut self) {
        if let Some(mut session) = self.list_session.take() {
            session.release();
        }
    }

    /// Re-fetch the post list and replace the store wholesale. Used on
    /// mount and after a transport reconnect to resynchronize.
    pub async fn refresh_posts(&mut self) -> Result<(), EngineError> {
        let posts = self.api.list_posts(&self.filter).await?;
        tracing::info!(count = posts.len(), "post list refreshed");
        self.posts.replace_all(posts);
        Ok(())
    }

    /// Mount a post's detail view: join its room and load the post and its
    /// comments.
    pub async fn open_post(&mut self, post_id: Uuid) -> Result<(), EngineError> {
        self.close_post();
        self.detail_session = Some(RoomSession::open(
            self.channel.clone(),
            Room::PostDetail(post_id),
        ));

        match self.api.get_post(post_id).await {
            Ok(detail) => {
                let post = detail.post.clone();
                if !self.posts.replace(post.id, {
                    let post = post.clone();
                    move |current| *current = post
                }) {
                    self.posts.insert_at_head(post);
                }
                self.thread = Some(CommentThread::new(post_id, detail.comments));
                Ok(())
            }
            Err(err) => {
                self.close_post();
                if err.is_not_found() {
                    self.posts.remove(post_id);
                }
                Err(err)
            }
        }
    }

    /// Unmount the detail view: leave its room and drop the comment thread.
    /// Further events for that room are discarded, and in-flight
    /// reconciliations against the thread are skipped.
    pub fn close_post(&mut self) {
        if let Some(mut session) = self.detail_session.take() {
            session.release();
        }
        self.thread = None;
    }

    /// Re-fetch the open post's detail and replace the thread wholesale.
    pub async fn refresh_post_detail(&mut self) -> Result<(), EngineError> {
        let Some(post_id) = self.thread.as_ref().map(|t| t.post_id) else {
            return Ok(());
        };
        let detail = self.api.get_post(post_id).await?;
        if let Some(thread) = self.thread.as_mut() {
            thread.comments.replace_all(detail.comments);
        }
        let post = detail.post;
        self.posts.replace(post.id, move |current| *current = post);
        Ok(())
    }

    // ---- realtime ingestion ----

    /// Apply a broadcast event through the store mutation surface.
    ///
    /// Events for rooms no view is mounted on are discarded, not buffered.
    /// Runs to completion synchronously; two events can never interleave.
    pub fn handle_event(&mut self, event: &RealtimeEvent) {
        match event.room() {
            Room::PostList => {
                let detail_matches = match (post_event_id(event), self.detail_session.as_ref()) {
                    (Some(id), Some(session)) => session.room() == Room::PostDetail(id),
                    _ => false,
                };
                if self.list_session.is_none() && !detail_matches {
                    tracing::debug!(event = event.name(), "event for unmounted list dropped");
                    return;
                }
                bridge::apply_event(&mut self.posts, self.thread.as_mut(), event);
            }
            Room::PostDetail(post_id) => {
                let mounted = self
                    .detail_session
                    .as_ref()
                    .is_some_and(|session| session.room() == Room::PostDetail(post_id));
                if !mounted {
                    tracing::debug!(event = event.name(), %post_id, "event for unmounted detail dropped");
                    return;
                }
                bridge::apply_event(&mut self.posts, self.thread.as_mut(), event);
            }
        }
    }

    // ---- mutations ----

    /// Cast a vote. Same direction toggles the vote off; the opposite
    /// direction replaces it in one transition.
    pub async fn vote(
        &mut self,
        post_id: Uuid,
        direction: VoteDirection,
    ) -> Result<MutationOutcome, EngineError> {
        if !self.in_flight.try_begin(MutationKind::Vote, post_id) {
            tracing::debug!(%post_id, "vote already in flight, suppressed");
            return Ok(MutationOutcome::Suppressed);
        }
        let result = self.vote_inner(post_id, direction).await;
        self.in_flight.finish(MutationKind::Vote, post_id);
        result
    }

    async fn vote_inner(
        &mut self,
        post_id: Uuid,
        direction: VoteDirection,
    ) -> Result<MutationOutcome, EngineError> {
        let snapshot = match self.posts.get(post_id) {
            Some(post) => post.tally.clone(),
            None => return Err(EngineError::not_found(post_id)),
        };

        let outcome = apply_vote(snapshot.viewer_vote, direction);
        self.posts.replace(post_id, |post| post.tally.apply(&outcome));
        tracing::info!(%post_id, ?direction, "vote dispatched");

        match self.api.vote(post_id, direction).await {
            Ok(receipt) => {
                if self.post_view_mounted(post_id) {
                    self.posts
                        .replace(post_id, |post| post.tally.replace_from(&receipt));
                } else {
                    tracing::debug!(%post_id, "vote resolved after unmount, reconciliation skipped");
                }
                Ok(MutationOutcome::Applied)
            }
            Err(err) if err.is_not_found() => {
                self.posts.remove(post_id);
                Err(err)
            }
            Err(err) => {
                tracing::warn!(%post_id, error = %err, "vote failed, rolling back");
                self.posts.replace(post_id, |post| post.tally = snapshot);
                Err(err)
            }
        }
    }

    /// Create a post. The speculative item appears immediately under a
    /// temporary ID and is replaced by the server payload on success.
    pub async fn create_post(
        &mut self,
        draft: NewPostRequest,
    ) -> Result<MutationOutcome, EngineError> {
        if !self.in_flight.try_begin(MutationKind::CreatePost, Uuid::nil()) {
            tracing::debug!("post creation already in flight, suppressed");
            return Ok(MutationOutcome::Suppressed);
        }
        let result = self.create_post_inner(draft).await;
        self.in_flight.finish(MutationKind::CreatePost, Uuid::nil());
        result
    }

    async fn create_post_inner(
        &mut self,
        draft: NewPostRequest,
    ) -> Result<MutationOutcome, EngineError> {
        if draft.title.trim().is_empty() {
            return Err(EngineError::validation("title", "cannot be empty"));
        }
        if draft.body.trim().is_empty() {
            return Err(EngineError::validation("body", "cannot be empty"));
        }

        let speculative = Post::optimistic(self.viewer.user.clone(), &draft);
        let temp_id = speculative.id;
        self.posts.insert_at_head(speculative);
        tracing::info!(%temp_id, "post creation dispatched");

        match self.api.create_post(&draft).await {
            Ok(post) => {
                // Undo the speculation, then apply the authoritative payload.
                // If the broadcast echo landed first the insert is a no-op,
                // leaving exactly one copy either way.
                self.posts.remove(temp_id);
                if self.list_session.is_some() {
                    self.posts.insert_at_head(post);
                } else {
                    tracing::debug!("create resolved after unmount, reconciliation skipped");
                }
                Ok(MutationOutcome::Applied)
            }
            Err(err) => {
                tracing::warn!(error = %err, "post creation failed, rolling back");
                self.posts.remove(temp_id);
                Err(err)
            }
        }
    }

    /// Edit a post's title and/or body.
    pub async fn update_post(
        &mut self,
        post_id: Uuid,
        edit: UpdatePostRequest,
    ) -> Result<MutationOutcome, EngineError> {
        if !self.in_flight.try_begin(MutationKind::UpdatePost, post_id) {
            return Ok(MutationOutcome::Suppressed);
        }
        let result = self.update_post_inner(post_id, edit).await;
        self.in_flight.finish(MutationKind::UpdatePost, post_id);
        result
    }

    async fn update_post_inner(
        &mut self,
        post_id: Uuid,
        edit: UpdatePostRequest,
    ) -> Result<MutationOutcome, EngineError> {
        let snapshot = match self.posts.get(post_id) {
            Some(post) => post.clone(),
            None => return Err(EngineError::not_found(post_id)),
        };
        if edit.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(EngineError::validation("title", "cannot be empty"));
        }

        self.posts.replace(post_id, |post| {
            if let Some(title) = edit.title.clone() {
                post.title = title;
            }
            if let Some(body) = edit.body.clone() {
                post.body = body;
            }
        });
        tracing::info!(%post_id, "post edit dispatched");

        match self.api.update_post(post_id, &edit).await {
            Ok(post) => {
                if self.post_view_mounted(post_id) {
                    self.posts.replace(post_id, move |current| *current = post);
                }
                Ok(MutationOutcome::Applied)
            }
            Err(err) if err.is_not_found() => {
                self.posts.remove(post_id);
                Err(err)
            }
            Err(err) => {
                tracing::warn!(%post_id, error = %err, "post edit failed, rolling back");
                self.posts.replace(post_id, move |current| *current = snapshot);
                Err(err)
            }
        }
    }

    /// Delete a post. The item disappears immediately and reappears if the
    /// server rejects the deletion.
    pub async fn delete_post(&mut self, post_id: Uuid) -> Result<MutationOutcome, EngineError> {
        if !self.in_flight.try_begin(MutationKind::DeletePost, post_id) {
            return Ok(MutationOutcome::Suppressed);
        }
        let result = self.delete_post_inner(post_id).await;
        self.in_flight.finish(MutationKind::DeletePost, post_id);
        result
    }

    async fn delete_post_inner(&mut self, post_id: Uuid) -> Result<MutationOutcome, EngineError> {
        if !self.posts.contains(post_id) {
            return Err(EngineError::not_found(post_id));
        }
        let snapshot = self.posts.clone();
        self.posts.remove(post_id);
        tracing::info!(%post_id, "post deletion dispatched");

        match self.api.delete_post(post_id).await {
            Ok(()) => {
                self.drop_thread_for(post_id);
                Ok(MutationOutcome::Applied)
            }
            // Already gone server-side; the local removal stands.
            Err(err) if err.is_not_found() => {
                self.drop_thread_for(post_id);
                Ok(MutationOutcome::Applied)
            }
            Err(err) => {
                tracing::warn!(%post_id, error = %err, "post deletion failed, restoring");
                self.posts = snapshot;
                Err(err)
            }
        }
    }

    /// Add a comment to the open post. Refused before any optimistic apply
    /// when the post is locked and the viewer is not a moderator.
    pub async fn add_comment(
        &mut self,
        post_id: Uuid,
        comment: NewCommentRequest,
    ) -> Result<MutationOutcome, EngineError> {
        if !self.in_flight.try_begin(MutationKind::CreateComment, post_id) {
            return Ok(MutationOutcome::Suppressed);
        }
        let result = self.add_comment_inner(post_id, comment).await;
        self.in_flight.finish(MutationKind::CreateComment, post_id);
        result
    }

    async fn add_comment_inner(
        &mut self,
        post_id: Uuid,
        comment: NewCommentRequest,
    ) -> Result<MutationOutcome, EngineError> {
        let post = self
            .posts
            .get(post_id)
            .ok_or_else(|| EngineError::not_found(post_id))?;
        // Checked against current state at dispatch, not UI affordances: a
        // lock that has not visually updated yet still refuses the comment.
        if !moderation::can_comment(&self.viewer, post) {
            return Err(EngineError::forbidden("post is locked"));
        }
        if comment.body.trim().is_empty() {
            return Err(EngineError::validation("body", "cannot be empty"));
        }
        if !self.thread.as_ref().is_some_and(|t| t.post_id == post_id) {
            return Err(EngineError::unknown("no open thread for this post"));
        }

        let speculative =
            Comment::optimistic(post_id, self.viewer.user.clone(), comment.body.as_str());
        let temp_id = speculative.id;
        if let Some(thread) = self.thread.as_mut() {
            thread.comments.append(speculative);
        }
        self.posts.replace(post_id, |post| {
            post.comment_count = post.comment_count.saturating_add(1);
        });
        tracing::info!(%post_id, %temp_id, "comment dispatched");

        match self.api.add_comment(post_id, &comment).await {
            Ok(created) => {
                let thread_mounted = self.thread.as_ref().is_some_and(|t| t.post_id == post_id);
                if thread_mounted {
                    // Undo the speculation, then apply the authoritative
                    // payload; a no-op append means the echo already landed.
                    let thread = self.thread.as_mut().expect("thread mounted");
                    thread.comments.remove(temp_id);
                    let appended = thread.comments.append(created);
                    if !appended {
                        self.posts.replace(post_id, |post| {
                            post.comment_count = post.comment_count.saturating_sub(1);
                        });
                    }
                } else {
                    tracing::debug!(%post_id, "comment resolved after unmount, reconciliation skipped");
                }
                Ok(MutationOutcome::Applied)
            }
            Err(err) => {
                tracing::warn!(%post_id, error = %err, "comment failed, rolling back");
                if let Some(thread) = self.thread.as_mut() {
                    thread.comments.remove(temp_id);
                }
                self.posts.replace(post_id, |post| {
                    post.comment_count = post.comment_count.saturating_sub(1);
                });
                if err.is_not_found() {
                    self.posts.remove(post_id);
                    self.drop_thread_for(post_id);
                }
                Err(err)
            }
        }
    }

    /// Delete a comment from the open post's thread.
    pub async fn delete_comment(
        &mut self,
        comment_id: Uuid,
    ) -> Result<MutationOutcome, EngineError> {
        if !self.in_flight.try_begin(MutationKind::DeleteComment, comment_id) {
            return Ok(MutationOutcome::Suppressed);
        }
        let result = self.delete_comment_inner(comment_id).await;
        self.in_flight.finish(MutationKind::DeleteComment, comment_id);
        result
    }

    async fn delete_comment_inner(
        &mut self,
        comment_id: Uuid,
    ) -> Result<MutationOutcome, EngineError> {
        let Some(thread) = self.thread.as_mut() else {
            return Err(EngineError::not_found(comment_id));
        };
        if !thread.comments.contains(comment_id) {
            return Err(EngineError::not_found(comment_id));
        }
        let post_id = thread.post_id;
        let snapshot = thread.comments.clone();
        thread.comments.remove(comment_id);
        self.posts.replace(post_id, |post| {
            post.comment_count = post.comment_count.saturating_sub(1);
        });
        tracing::info!(%comment_id, "comment deletion dispatched");

        match self.api.delete_comment(comment_id).await {
            Ok(()) => Ok(MutationOutcome::Applied),
            Err(err) if err.is_not_found() => Ok(MutationOutcome::Applied),
            Err(err) => {
                tracing::warn!(%comment_id, error = %err, "comment deletion failed, restoring");
                if let Some(thread) = self.thread.as_mut() {
                    if thread.post_id == post_id {
                        thread.comments = snapshot;
                    }
                }
                self.posts.replace(post_id, |post| {
                    post.comment_count = post.comment_count.saturating_add(1);
                });
                Err(err)
            }
        }
    }

    /// Pin or unpin a post. Moderator only; checked at dispatch.
    pub async fn toggle_pin(&mut self, post_id: Uuid) -> Result<MutationOutcome, EngineError> {
        if !self.in_flight.try_begin(MutationKind::TogglePin, post_id) {
            return Ok(MutationOutcome::Suppressed);
        }
        let result = self
            .toggle_flag_inner(post_id, MutationKind::TogglePin)
            .await;
        self.in_flight.finish(MutationKind::TogglePin, post_id);
        result
    }

    /// Lock or unlock a post. Moderator only; checked at dispatch.
    pub async fn toggle_lock(&mut self, post_id: Uuid) -> Result<MutationOutcome, EngineError> {
        if !self.in_flight.try_begin(MutationKind::ToggleLock, post_id) {
            return Ok(MutationOutcome::Suppressed);
        }
        let result = self
            .toggle_flag_inner(post_id, MutationKind::ToggleLock)
            .await;
        self.in_flight.finish(MutationKind::ToggleLock, post_id);
        result
    }

    async fn toggle_flag_inner(
        &mut self,
        post_id: Uuid,
        kind: MutationKind,
    ) -> Result<MutationOutcome, EngineError> {
        if !moderation::can_moderate(&self.viewer) {
            return Err(EngineError::forbidden("moderator role required"));
        }
        let snapshot = match self.posts.get(post_id) {
            Some(post) => post.clone(),
            None => return Err(EngineError::not_found(post_id)),
        };

        self.posts.replace(post_id, |post| match kind {
            MutationKind::TogglePin => moderation::toggle_pin(post),
            _ => moderation::toggle_lock(post),
        });
        tracing::info!(%post_id, ?kind, "moderation toggle dispatched");

        let call = match kind {
            MutationKind::TogglePin => self.api.toggle_pin(post_id).await,
            _ => self.api.toggle_lock(post_id).await,
        };
        match call {
            Ok(post) => {
                if self.post_view_mounted(post_id) {
                    self.posts.replace(post_id, move |current| *current = post);
                }
                Ok(MutationOutcome::Applied)
            }
            Err(err) if err.is_not_found() => {
                self.posts.remove(post_id);
                Err(err)
            }
            Err(err) => {
                tracing::warn!(%post_id, error = %err, "moderation toggle failed, rolling back");
                self.posts.replace(post_id, move |current| *current = snapshot);
                Err(err)
            }
        }
    }

    /// Close the detail view when its post was confirmed gone
    fn drop_thread_for(&mut self, post_id: Uuid) {
        if self.thread.as_ref().is_some_and(|t| t.post_id == post_id) {
            self.close_post();
        }
    }

    /// Whether any mounted view still renders this post
    fn post_view_mounted(&self, post_id: Uuid) -> bool {
        self.list_session.is_some()
            || self
                .detail_session
                .as_ref()
                .is_some_and(|session| session.room() == Room::PostDetail(post_id))
    }
}

/// The post ID a post-list event refers to, if it is one
fn post_event_id(event: &RealtimeEvent) -> Option<Uuid> {
    match event {
        RealtimeEvent::NewPost { post } | RealtimeEvent::PostUpdated { post } => Some(post.id),
        RealtimeEvent::PostDeleted { id } => Some(*id),
        _ => None,
    }
}
