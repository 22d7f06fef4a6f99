//! Shared test fixtures
//!
//! An in-memory `DiscussionApi` that behaves like the real backend (server
//! assigns IDs, enforces locks, owns the vote aggregate), plus entity
//! builders used across the suites.

use async_trait::async_trait;
use campusboard::client::DiscussionApi;
use campusboard::engine::apply_vote;
use campusboard::shared::comment::{Comment, NewCommentRequest};
use campusboard::shared::error::EngineError;
use campusboard::shared::filter::PostFilter;
use campusboard::shared::post::{
    NewPostRequest, Post, PostCategory, PostDetail, UpdatePostRequest, VoteDirection, VoteReceipt,
};
use campusboard::shared::user::{Role, UserRef, Viewer};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

pub fn member() -> Viewer {
    Viewer::new(UserRef::new(Uuid::new_v4(), "member"), Role::Member)
}

pub fn moderator() -> Viewer {
    Viewer::new(UserRef::new(Uuid::new_v4(), "mod"), Role::Moderator)
}

pub fn sample_post(title: &str) -> Post {
    Post::optimistic(
        UserRef::new(Uuid::new_v4(), "author"),
        &NewPostRequest {
            title: title.to_string(),
            body: "body".to_string(),
            category: PostCategory::General,
        },
    )
}

#[derive(Default)]
struct FakeState {
    posts: Vec<Post>,
    comments: HashMap<Uuid, Vec<Comment>>,
    fail_next: Option<EngineError>,
    vote_receipt: Option<VoteReceipt>,
}

/// In-memory backend double. Single-viewer: the stored `viewer_vote` is the
/// test viewer's own vote.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(posts: Vec<Post>) -> Self {
        let api = Self::new();
        api.state.lock().unwrap().posts = posts;
        api
    }

    /// Make the next mutating call fail with `error`
    pub fn fail_next(&self, error: EngineError) {
        self.state.lock().unwrap().fail_next = Some(error);
    }

    /// Answer every vote with a fixed receipt instead of the computed
    /// aggregate, so tests can tell an applied reconciliation from a
    /// skipped one.
    pub fn respond_to_vote_with(&self, receipt: VoteReceipt) {
        self.state.lock().unwrap().vote_receipt = Some(receipt);
    }

    /// Current server-side copy of a post
    pub fn server_post(&self, id: Uuid) -> Option<Post> {
        self.state
            .lock()
            .unwrap()
            .posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn server_post_count(&self) -> usize {
        self.state.lock().unwrap().posts.len()
    }

    fn take_failure(state: &mut FakeState) -> Result<(), EngineError> {
        match state.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DiscussionApi for FakeApi {
    async fn list_posts(&self, _filter: &PostFilter) -> Result<Vec<Post>, EngineError> {
        Ok(self.state.lock().unwrap().posts.clone())
    }

    async fn get_post(&self, id: Uuid) -> Result<PostDetail, EngineError> {
        let state = self.state.lock().unwrap();
        let post = state
            .posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(EngineError::not_found(id))?;
        let comments = state.comments.get(&id).cloned().unwrap_or_default();
        Ok(PostDetail { post, comments })
    }

    async fn create_post(&self, draft: &NewPostRequest) -> Result<Post, EngineError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        let mut post = Post::optimistic(UserRef::new(Uuid::new_v4(), "member"), draft);
        // Server-assigned fields
        post.id = Uuid::new_v4();
        post.created_at = Utc::now();
        state.posts.insert(0, post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: Uuid, edit: &UpdatePostRequest) -> Result<Post, EngineError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(EngineError::not_found(id))?;
        if let Some(title) = edit.title.clone() {
            post.title = title;
        }
        if let Some(body) = edit.body.clone() {
            post.body = body;
        }
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        let before = state.posts.len();
        state.posts.retain(|p| p.id != id);
        if state.posts.len() == before {
            return Err(EngineError::not_found(id));
        }
        state.comments.remove(&id);
        Ok(())
    }

    async fn vote(
        &self,
        post_id: Uuid,
        direction: VoteDirection,
    ) -> Result<VoteReceipt, EngineError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        let canned = state.vote_receipt.clone();
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(EngineError::not_found(post_id))?;
        if let Some(receipt) = canned {
            return Ok(receipt);
        }
        // The server applies the same toggle semantics and owns the result
        let outcome = apply_vote(post.tally.viewer_vote, direction);
        post.tally.apply(&outcome);
        Ok(VoteReceipt {
            score: post.tally.score,
            upvotes: post.tally.upvotes,
            downvotes: post.tally.downvotes,
            viewer_vote: post.tally.viewer_vote,
        })
    }

    async fn add_comment(
        &self,
        post_id: Uuid,
        comment: &NewCommentRequest,
    ) -> Result<Comment, EngineError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(EngineError::not_found(post_id))?;
        if post.locked {
            return Err(EngineError::forbidden("post is locked"));
        }
        post.comment_count += 1;
        let created = Comment {
            id: Uuid::new_v4(),
            post_id,
            author: UserRef::new(Uuid::new_v4(), "member"),
            body: comment.body.clone(),
            created_at: Utc::now(),
        };
        state.comments.entry(post_id).or_default().push(created.clone());
        Ok(created)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        let mut owner = None;
        for (post_id, comments) in state.comments.iter_mut() {
            let before = comments.len();
            comments.retain(|c| c.id != id);
            if comments.len() < before {
                owner = Some(*post_id);
                break;
            }
        }
        let post_id = owner.ok_or(EngineError::not_found(id))?;
        if let Some(post) = state.posts.iter_mut().find(|p| p.id == post_id) {
            post.comment_count = post.comment_count.saturating_sub(1);
        }
        Ok(())
    }

    async fn toggle_pin(&self, id: Uuid) -> Result<Post, EngineError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(EngineError::not_found(id))?;
        post.pinned = !post.pinned;
        Ok(post.clone())
    }

    async fn toggle_lock(&self, id: Uuid) -> Result<Post, EngineError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(EngineError::not_found(id))?;
        post.locked = !post.locked;
        Ok(post.clone())
    }
}
