//! Discussion API Client
//!
//! The consumed HTTP API as an async trait, plus the reqwest-backed
//! implementation. Every endpoint returns authoritative post-mutation state
//! which the coordinator uses for reconciliation; the client maps HTTP
//! failure statuses onto the engine error taxonomy.

use crate::shared::comment::{Comment, NewCommentRequest};
use crate::shared::config::EngineConfig;
use crate::shared::error::EngineError;
use crate::shared::filter::PostFilter;
use crate::shared::post::{
    NewPostRequest, Post, PostDetail, UpdatePostRequest, VoteDirection, VoteReceipt, VoteRequest,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use uuid::Uuid;

/// The post/comment/vote operations the engine consumes.
///
/// Implementations must return authoritative state: the coordinator replaces
/// server-owned fields with whatever comes back here.
#[async_trait]
pub trait DiscussionApi: Send + Sync {
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, EngineError>;
    async fn get_post(&self, id: Uuid) -> Result<PostDetail, EngineError>;
    async fn create_post(&self, draft: &NewPostRequest) -> Result<Post, EngineError>;
    async fn update_post(&self, id: Uuid, edit: &UpdatePostRequest) -> Result<Post, EngineError>;
    async fn delete_post(&self, id: Uuid) -> Result<(), EngineError>;
    async fn vote(&self, post_id: Uuid, direction: VoteDirection)
        -> Result<VoteReceipt, EngineError>;
    async fn add_comment(
        &self,
        post_id: Uuid,
        comment: &NewCommentRequest,
    ) -> Result<Comment, EngineError>;
    async fn delete_comment(&self, id: Uuid) -> Result<(), EngineError>;
    async fn toggle_pin(&self, id: Uuid) -> Result<Post, EngineError>;
    async fn toggle_lock(&self, id: Uuid) -> Result<Post, EngineError>;
}

/// Response wrapper for the list endpoint
#[derive(Debug, Deserialize)]
struct ListPostsResponse {
    posts: Vec<Post>,
}

/// HTTP implementation of `DiscussionApi`
pub struct HttpApi {
    config: EngineConfig,
    client: Client,
}

impl HttpApi {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.token() {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Convert a non-success response into the taxonomy; `entity` is the ID
    /// the request referred to, when there is one.
    async fn check(response: Response, entity: Option<Uuid>) -> Result<Response, EngineError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "api request failed");
        Err(EngineError::from_response(status.as_u16(), &body, entity))
    }
}

#[async_trait]
impl DiscussionApi for HttpApi {
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, EngineError> {
        let url = self.config.api_url("/api/posts");
        let response = self
            .authorize(self.client.get(&url).query(&filter.to_query()))
            .send()
            .await?;
        let response = Self::check(response, None).await?;
        let list: ListPostsResponse = response.json().await?;
        Ok(list.posts)
    }

    async fn get_post(&self, id: Uuid) -> Result<PostDetail, EngineError> {
        let url = self.config.api_url(&format!("/api/posts/{}", id));
        let response = self.authorize(self.client.get(&url)).send().await?;
        let response = Self::check(response, Some(id)).await?;
        Ok(response.json().await?)
    }

    async fn create_post(&self, draft: &NewPostRequest) -> Result<Post, EngineError> {
        let url = self.config.api_url("/api/posts");
        let response = self
            .authorize(self.client.post(&url).json(draft))
            .send()
            .await?;
        let response = Self::check(response, None).await?;
        Ok(response.json().await?)
    }

    async fn update_post(&self, id: Uuid, edit: &UpdatePostRequest) -> Result<Post, EngineError> {
        let url = self.config.api_url(&format!("/api/posts/{}", id));
        let response = self
            .authorize(self.client.put(&url).json(edit))
            .send()
            .await?;
        let response = Self::check(response, Some(id)).await?;
        Ok(response.json().await?)
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), EngineError> {
        let url = self.config.api_url(&format!("/api/posts/{}", id));
        let response = self.authorize(self.client.delete(&url)).send().await?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }

    async fn vote(
        &self,
        post_id: Uuid,
        direction: VoteDirection,
    ) -> Result<VoteReceipt, EngineError> {
        let url = self.config.api_url(&format!("/api/posts/{}/vote", post_id));
        let response = self
            .authorize(self.client.post(&url).json(&VoteRequest { direction }))
            .send()
            .await?;
        let response = Self::check(response, Some(post_id)).await?;
        Ok(response.json().await?)
    }

    async fn add_comment(
        &self,
        post_id: Uuid,
        comment: &NewCommentRequest,
    ) -> Result<Comment, EngineError> {
        let url = self
            .config
            .api_url(&format!("/api/posts/{}/comments", post_id));
        let response = self
            .authorize(self.client.post(&url).json(comment))
            .send()
            .await?;
        let response = Self::check(response, Some(post_id)).await?;
        Ok(response.json().await?)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<(), EngineError> {
        let url = self.config.api_url(&format!("/api/comments/{}", id));
        let response = self.authorize(self.client.delete(&url)).send().await?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }

    async fn toggle_pin(&self, id: Uuid) -> Result<Post, EngineError> {
        let url = self.config.api_url(&format!("/api/posts/{}/pin", id));
        let response = self.authorize(self.client.post(&url)).send().await?;
        let response = Self::check(response, Some(id)).await?;
        Ok(response.json().await?)
    }

    async fn toggle_lock(&self, id: Uuid) -> Result<Post, EngineError> {
        let url = self.config.api_url(&format!("/api/posts/{}/lock", id));
        let response = self.authorize(self.client.post(&url)).send().await?;
        let response = Self::check(response, Some(id)).await?;
        Ok(response.json().await?)
    }
}
