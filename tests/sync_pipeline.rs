mod common;

use std::sync::Arc;

use chrono::Utc;
use common::{
    client_for, commit_json, event_json, repo_json, user_json, MockGitHub, TestContext,
};
use github_dashboard::analytics::View;
use github_dashboard::config::FetchLimits;
use github_dashboard::error::DashboardError;
use github_dashboard::presentation::{ChartPayload, DashboardSection};
use github_dashboard::models::Repository;
use github_dashboard::session::Session;
use github_dashboard::storage::Filter;
use github_dashboard::sync::{SyncOutcome, Syncer};
use serde_json::json;

/// Two Python repos, one Go repo and a fork, with commits, events and topics.
fn mock_alice(mock: &MockGitHub) {
    let mut fork = repo_json("upstream-fork", Some("C"), 40);
    fork["fork"] = json!(true);
    mock.respond("/users/alice", user_json("alice", 12));
    mock.respond(
        "/users/alice/repos",
        json!([
            repo_json("scraper", Some("Python"), 8),
            repo_json("notebooks", Some("Python"), 2),
            repo_json("server", Some("Go"), 5),
            fork,
        ]),
    );
    mock.respond(
        "/users/alice/events",
        json!([
            event_json("PushEvent", "2024-03-01T10:00:00Z"),
            event_json("WatchEvent", "2024-03-02T10:00:00Z"),
        ]),
    );
    mock.respond(
        "/repos/alice/scraper/commits",
        json!([
            commit_json("2024-03-04T09:00:00Z", "Add parser"),
            commit_json("2024-03-05T09:00:00Z", "Fix parser"),
        ]),
    );
    mock.respond(
        "/repos/alice/server/commits",
        json!([commit_json("2024-03-06T09:00:00Z", "Initial commit")]),
    );
    mock.respond(
        "/repos/alice/scraper/topics",
        json!({ "names": ["python", "scraping"] }),
    );
}

async fn syncer_for(mock: &MockGitHub) -> Syncer {
    let client = client_for(&mock.start().await, FetchLimits::default());
    Syncer::new(Arc::new(client), TestContext::new().gateway)
}

#[tokio::test]
async fn test_sync_populates_every_collection() {
    let mock = MockGitHub::new();
    mock_alice(&mock);
    let syncer = syncer_for(&mock).await;

    let report = syncer.sync_user("alice").await.expect("Sync failed");

    assert_eq!(report.repositories, 4);
    assert_eq!(report.events, 2);
    assert_eq!(report.commits, 3);
    assert_eq!(report.topic_sets, 1);
    assert_eq!(report.languages, 2);

    let languages = syncer.gateway().languages("alice").await.unwrap();
    assert_eq!(languages[0].language, "Python");
    assert_eq!(languages[0].percentage, 66.67);
    assert_eq!(languages[1].percentage, 33.33);
}

#[tokio::test]
async fn test_sync_trims_username() {
    let mock = MockGitHub::new();
    mock_alice(&mock);
    let syncer = syncer_for(&mock).await;

    let report = syncer.sync_user("  alice ").await.expect("Sync failed");

    assert_eq!(report.username, "alice");
    assert!(syncer.gateway().user_exists("alice").await.unwrap());
}

#[tokio::test]
async fn test_blank_username_is_rejected() {
    let mock = MockGitHub::new();
    let syncer = syncer_for(&mock).await;

    match syncer.sync_user("   ").await.unwrap_err() {
        DashboardError::Config(_) => {}
        other => panic!("Expected Config error, got: {:?}", other),
    }
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_unknown_user_stores_nothing() {
    let mock = MockGitHub::new();
    let syncer = syncer_for(&mock).await;

    let result = syncer.sync_user("ghost").await;

    assert!(matches!(result, Err(DashboardError::NotFound(_))));
    assert!(!syncer.gateway().user_exists("ghost").await.unwrap());
    assert_eq!(mock.requests(), vec!["/users/ghost".to_string()]);
}

#[tokio::test]
async fn test_load_or_fetch_uses_stored_snapshot() {
    let mock = MockGitHub::new();
    mock_alice(&mock);
    let syncer = syncer_for(&mock).await;

    let first = syncer.load_or_fetch("alice").await.unwrap();
    let requests_after_first = mock.requests().len();
    let second = syncer.load_or_fetch("alice").await.unwrap();

    assert!(matches!(first, SyncOutcome::Fetched(_)));
    assert_eq!(second, SyncOutcome::Cached);
    assert_eq!(mock.requests().len(), requests_after_first);
}

#[tokio::test]
async fn test_refresh_replaces_snapshot() {
    let mock = MockGitHub::new();
    mock_alice(&mock);
    let syncer = syncer_for(&mock).await;

    syncer.sync_user("alice").await.unwrap();
    syncer.refresh("alice").await.unwrap();

    let gateway = syncer.gateway();
    assert_eq!(gateway.repos("alice").await.unwrap().len(), 4);
    assert_eq!(gateway.commits("alice").await.unwrap().len(), 3);
    assert_eq!(gateway.events("alice").await.unwrap().len(), 2);
    assert_eq!(gateway.topics("alice").await.unwrap().len(), 1);
    assert_eq!(gateway.languages("alice").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_refresh_drops_repos_no_longer_listed() {
    let mock = MockGitHub::new();
    mock.respond("/users/alice", user_json("alice", 3));
    mock.respond("/users/alice/repos", json!([repo_json("old", Some("Rust"), 1)]));
    let syncer = syncer_for(&mock).await;
    syncer.sync_user("alice").await.unwrap();

    mock.respond("/users/alice/repos", json!([repo_json("new", Some("Go"), 2)]));
    syncer.refresh("alice").await.unwrap();

    let gateway = syncer.gateway();
    let stale = gateway
        .find_one::<Repository>(&Filter::username("alice").eq("repo_name", "old"))
        .await
        .unwrap();
    assert!(stale.is_none());
    let repos = gateway.repos("alice").await.unwrap();
    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0].repo_name, "new");
    let languages = gateway.languages("alice").await.unwrap();
    assert_eq!(languages.len(), 1);
    assert_eq!(languages[0].language, "Go");
}

#[tokio::test]
async fn test_refresh_rejects_blank_username_before_clearing() {
    let mock = MockGitHub::new();
    let syncer = syncer_for(&mock).await;
    syncer
        .gateway()
        .insert_many(&[common::user("", 1)])
        .await
        .unwrap();

    match syncer.refresh("  ").await.unwrap_err() {
        DashboardError::Config(_) => {}
        other => panic!("Expected Config error, got: {:?}", other),
    }
    assert!(syncer.gateway().user_exists("").await.unwrap());
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_partial_failures_still_sync() {
    let mock = MockGitHub::new();
    mock.respond("/users/bob", user_json("bob", 1));
    mock.respond("/users/bob/repos", json!([repo_json("solo", Some("Rust"), 3)]));
    mock.respond_with("/users/bob/events", 500, json!({ "message": "boom" }));
    let syncer = syncer_for(&mock).await;

    let report = syncer.sync_user("bob").await.expect("Sync failed");

    assert_eq!(report.repositories, 1);
    assert_eq!(report.events, 0);
    assert_eq!(report.commits, 0);
    assert_eq!(report.topic_sets, 0);
    assert_eq!(report.languages, 1);
}

#[tokio::test]
async fn test_session_renders_after_sync() {
    let mock = MockGitHub::new();
    mock_alice(&mock);
    let syncer = syncer_for(&mock).await;
    syncer.sync_user("alice").await.unwrap();

    let session = Session::for_user("alice").with_section(DashboardSection::Skills);
    let panels = session
        .render(syncer.gateway(), Utc::now())
        .await
        .expect("a user is selected");

    assert_eq!(panels.len(), 3);
    assert_eq!(panels[0].title, "Programming Languages");
    match &panels[0].chart {
        ChartPayload::Pie { labels, .. } => assert_eq!(labels, &vec!["Python", "Go"]),
        other => panic!("Expected a pie chart, got: {:?}", other),
    }

    match session.summary(syncer.gateway()).await.unwrap() {
        View::Ready(summary) => assert_eq!(summary.total_stars, 15),
        View::NoData => panic!("Expected a summary"),
    }
}

#[tokio::test]
async fn test_session_without_user_renders_nothing() {
    let mut session = Session::new();
    session.select_user("   ");

    assert!(session.active_user().is_none());
    assert!(session
        .render(&TestContext::new().gateway, Utc::now())
        .await
        .is_none());
}
