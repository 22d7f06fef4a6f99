//! HTTP client tests against a wiremock server: endpoint shapes, bearer
//! auth, and the mapping from failure statuses onto the error taxonomy.

use crate::common::sample_post;
use assert_matches::assert_matches;
use campusboard::client::{DiscussionApi, HttpApi};
use campusboard::shared::config::EngineConfig;
use campusboard::shared::error::EngineError;
use campusboard::shared::filter::{CategoryFilter, PostFilter};
use campusboard::shared::post::{
    NewPostRequest, PostCategory, UpdatePostRequest, VoteDirection, VoteState,
};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpApi {
    let config = EngineConfig::builder()
        .server_url(server.uri())
        .token("test-token")
        .build()
        .unwrap();
    HttpApi::new(config)
}

#[tokio::test]
async fn test_list_posts_sends_query_and_bearer() {
    let server = MockServer::start().await;
    let post = sample_post("from the wire");
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(query_param("category", "housing"))
        .and(query_param("sort_by", "popular"))
        .and(query_param("sort_order", "desc"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "posts": [post] })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_for(&server);
    let filter = PostFilter {
        category: CategoryFilter::Category(PostCategory::Housing),
        sort_by: campusboard::shared::filter::SortBy::Popular,
        ..Default::default()
    };
    let posts = api.list_posts(&filter).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "from the wire");
}

#[tokio::test]
async fn test_vote_decodes_receipt() {
    let server = MockServer::start().await;
    let post_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path(format!("/api/posts/{}/vote", post_id)))
        .and(body_json(json!({ "direction": "up" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "score": 4,
            "upvotes": 5,
            "downvotes": 1,
            "viewer_vote": "up"
        })))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let receipt = api.vote(post_id, VoteDirection::Up).await.unwrap();
    assert_eq!(receipt.score, 4);
    assert_eq!(receipt.upvotes, 5);
    assert_eq!(receipt.viewer_vote, VoteState::Up);
}

#[tokio::test]
async fn test_401_maps_to_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let result = api.list_posts(&PostFilter::default()).await;
    assert_matches!(result, Err(EngineError::Unauthenticated));
}

#[tokio::test]
async fn test_403_maps_to_forbidden_with_reason() {
    let server = MockServer::start().await;
    let post_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path(format!("/api/posts/{}/comments", post_id)))
        .respond_with(ResponseTemplate::new(403).set_body_string("post is locked"))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let result = api
        .add_comment(
            post_id,
            &campusboard::shared::comment::NewCommentRequest {
                body: "hi".to_string(),
            },
        )
        .await;
    assert_matches!(result, Err(EngineError::Forbidden { reason }) if reason == "post is locked");
}

#[tokio::test]
async fn test_404_carries_the_entity_id() {
    let server = MockServer::start().await;
    let post_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/api/posts/{}", post_id)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let result = api.get_post(post_id).await;
    assert_matches!(result, Err(EngineError::NotFound { id }) if id == post_id);
}

#[tokio::test]
async fn test_422_decodes_validation_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "field": "title",
            "message": "too long"
        })))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let result = api
        .create_post(&NewPostRequest {
            title: "x".repeat(500),
            body: "b".to_string(),
            category: PostCategory::General,
        })
        .await;
    assert_matches!(
        result,
        Err(EngineError::ValidationFailed { field, message })
            if field == "title" && message == "too long"
    );
}

#[tokio::test]
async fn test_update_omits_absent_fields_on_the_wire() {
    let server = MockServer::start().await;
    let post = sample_post("edited");
    Mock::given(method("PUT"))
        .and(path(format!("/api/posts/{}", post.id)))
        .and(body_json(json!({ "title": "new title" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&post))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_for(&server);
    let edit = UpdatePostRequest {
        title: Some("new title".to_string()),
        body: None,
    };
    api.update_post(post.id, &edit).await.unwrap();
}

#[tokio::test]
async fn test_toggle_lock_returns_updated_post() {
    let server = MockServer::start().await;
    let mut post = sample_post("lockable");
    post.locked = true;
    Mock::given(method("POST"))
        .and(path(format!("/api/posts/{}/lock", post.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(&post))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let updated = api.toggle_lock(post.id).await.unwrap();
    assert!(updated.locked);
}

#[tokio::test]
async fn test_delete_post_succeeds_on_204() {
    let server = MockServer::start().await;
    let post_id = Uuid::new_v4();
    Mock::given(method("DELETE"))
        .and(path(format!("/api/posts/{}", post_id)))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let api = client_for(&server);
    api.delete_post(post_id).await.unwrap();
}
