mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use common::{client_for, repo, repo_json, user, user_json, MockGitHub, TestContext};
use github_dashboard::api::{create_router, AppState};
use github_dashboard::config::FetchLimits;
use github_dashboard::sync::Syncer;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app_state(mock: &MockGitHub) -> AppState {
    let client = client_for(&mock.start().await, FetchLimits::default());
    let ctx = TestContext::new();
    ctx.gateway.insert_many(&[user("alice", 8)]).await.unwrap();
    ctx.gateway
        .insert_many(&[
            repo("alice", "cli", Some("Rust"), 4),
            repo("alice", "site", Some("TypeScript"), 1),
        ])
        .await
        .unwrap();
    AppState::new(Syncer::new(Arc::new(client), ctx.gateway))
}

async fn send(state: AppState, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = create_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let state = app_state(&MockGitHub::new()).await;

    let (status, body) = send(state, Method::GET, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_summary_of_stored_user() {
    let state = app_state(&MockGitHub::new()).await;

    let (status, body) = send(state, Method::GET, "/users/alice/summary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["data"]["followers"], 8);
    assert_eq!(body["data"]["total_stars"], 5);
}

#[tokio::test]
async fn test_summary_of_unknown_user_is_no_data() {
    let state = app_state(&MockGitHub::new()).await;

    let (status, body) = send(state, Method::GET, "/users/nobody/summary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "no_data");
}

#[tokio::test]
async fn test_section_panels() {
    let state = app_state(&MockGitHub::new()).await;

    let (status, body) = send(state, Method::GET, "/users/alice/sections/Repositories").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["section"], "repositories");
    let panels = body["panels"].as_array().unwrap();
    assert_eq!(panels.len(), 4);
    assert_eq!(panels[0]["title"], "Top Repositories");
    assert_eq!(panels[0]["chart"]["kind"], "tables");
    // No topics were stored.
    assert_eq!(panels[2]["chart"]["kind"], "no_data");
}

#[tokio::test]
async fn test_unknown_section_is_not_found() {
    let state = app_state(&MockGitHub::new()).await;

    let (status, body) = send(state, Method::GET, "/users/alice/sections/settings").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "unknown dashboard section: settings");
}

#[tokio::test]
async fn test_fetch_returns_cached_for_stored_user() {
    let mock = MockGitHub::new();
    let state = app_state(&mock).await;

    let (status, body) = send(state, Method::POST, "/users/alice/fetch").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "cached");
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_fetch_new_user() {
    let mock = MockGitHub::new();
    mock.respond("/users/bob", user_json("bob", 2));
    mock.respond("/users/bob/repos", json!([repo_json("tool", Some("Rust"), 1)]));
    let state = app_state(&mock).await;

    let (status, body) = send(state, Method::POST, "/users/bob/fetch").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fetched");
    assert_eq!(body["repositories"], 1);
    assert_eq!(body["languages"], 1);
}

#[tokio::test]
async fn test_upstream_errors_map_to_status_codes() {
    let mock = MockGitHub::new();
    mock.respond_with(
        "/users/limited",
        403,
        json!({ "message": "API rate limit exceeded" }),
    );
    mock.respond_with("/users/broken", 502, json!({ "message": "Bad Gateway" }));
    let state = app_state(&mock).await;

    let (status, body) = send(state.clone(), Method::POST, "/users/ghost/refresh").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Resource not found: user ghost");

    let (status, _) = send(state.clone(), Method::POST, "/users/limited/refresh").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, body) = send(state, Method::POST, "/users/broken/refresh").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "GitHub API error (502): Bad Gateway");
}
