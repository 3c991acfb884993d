#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use github_dashboard::config::{ClientConfig, FetchLimits, StoreConfig};
use github_dashboard::github::GitHubClient;
use github_dashboard::models::{Commit, Event, Repository, User};
use github_dashboard::storage::{StorageGateway, SurrealStore};

pub struct TestContext {
    pub gateway: StorageGateway,
}

impl TestContext {
    pub fn new() -> Self {
        TestContext {
            gateway: StorageGateway::in_memory(),
        }
    }

    /// Embedded SurrealDB; no server needed.
    pub async fn with_surreal() -> anyhow::Result<Self> {
        let store = SurrealStore::connect(&StoreConfig::default()).await?;
        Ok(TestContext {
            gateway: StorageGateway::new(store),
        })
    }
}

pub fn ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

pub fn user(username: &str, followers: u64) -> User {
    User {
        username: username.to_string(),
        followers,
        following: 3,
        public_repos: 4,
        avatar: format!("https://avatars.example.com/{}", username),
        fetched_at: ts("2024-06-01T00:00:00Z"),
    }
}

pub fn repo(username: &str, name: &str, language: Option<&str>, stars: u64) -> Repository {
    Repository {
        username: username.to_string(),
        repo_name: name.to_string(),
        stars,
        forks: 0,
        size_kb: 100,
        language: language.map(str::to_string),
        created_at: Some(ts("2024-01-01T00:00:00Z")),
        updated_at: Some(ts("2024-05-01T00:00:00Z")),
        is_fork: false,
        is_archived: false,
        topics: BTreeSet::new(),
        open_issues: 0,
    }
}

pub fn commit(username: &str, repo: &str, timestamp: &str) -> Commit {
    Commit {
        username: username.to_string(),
        repo: repo.to_string(),
        timestamp: Some(ts(timestamp)),
        message: "Update README".to_string(),
    }
}

pub fn event(username: &str, event_type: &str, created_at: &str) -> Event {
    Event {
        username: username.to_string(),
        event_type: event_type.to_string(),
        repo: Some(format!("{}/project", username)),
        created_at: Some(ts(created_at)),
    }
}

pub fn user_json(login: &str, followers: u64) -> Value {
    json!({
        "login": login,
        "followers": followers,
        "following": 2,
        "public_repos": 3,
        "avatar_url": format!("https://avatars.example.com/{}", login),
    })
}

pub fn repo_json(name: &str, language: Option<&str>, stars: u64) -> Value {
    json!({
        "name": name,
        "stargazers_count": stars,
        "forks_count": 1,
        "size": 250,
        "language": language,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-05-01T00:00:00Z",
        "fork": false,
        "archived": false,
        "topics": [],
        "open_issues_count": 2,
    })
}

pub fn commit_json(date: &str, message: &str) -> Value {
    json!({
        "sha": "abc123",
        "commit": {
            "author": { "name": "Test", "date": date },
            "message": message,
        }
    })
}

pub fn event_json(event_type: &str, created_at: &str) -> Value {
    json!({
        "type": event_type,
        "repo": { "name": "alice/project" },
        "created_at": created_at,
    })
}

/// Canned GitHub API. Paths not registered answer 404.
#[derive(Clone, Default)]
pub struct MockGitHub {
    responses: Arc<Mutex<HashMap<String, (StatusCode, Value)>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a 200 response. `path` may include a query string, which then
    /// has to match exactly.
    pub fn respond(&self, path: &str, body: Value) -> &Self {
        self.respond_with(path, 200, body)
    }

    pub fn respond_with(&self, path: &str, status: u16, body: Value) -> &Self {
        let status = StatusCode::from_u16(status).expect("valid status");
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    /// Serve on an ephemeral local port and return the base URL.
    pub async fn start(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");
        let app = Router::new().fallback(handle).with_state(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        format!("http://{}", addr)
    }
}

async fn handle(State(mock): State<MockGitHub>, uri: Uri) -> (StatusCode, Json<Value>) {
    let full = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    mock.requests.lock().unwrap().push(full.clone());

    let responses = mock.responses.lock().unwrap();
    match responses.get(&full).or_else(|| responses.get(uri.path())) {
        Some((status, body)) => (*status, Json(body.clone())),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))),
    }
}

pub fn client_for(base_url: &str, limits: FetchLimits) -> GitHubClient {
    GitHubClient::new(ClientConfig {
        api_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
        limits,
    })
    .expect("Failed to create client")
}
