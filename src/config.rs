use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Caps that keep anonymous fetches under the upstream rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    /// Only the first N repositories (in listing order) are scanned for commits.
    pub commit_repos: usize,
    /// Only the first N repositories (in listing order) are scanned for topics.
    pub topic_repos: usize,
    pub per_page: u32,
    pub message_chars: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            commit_repos: 10,
            topic_repos: 20,
            per_page: 100,
            message_chars: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub limits: FetchLimits,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            limits: FetchLimits::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub namespace: String,
    pub database: String,
}

impl StoreConfig {
    /// Embedded engines (`mem://`, `surrealkv://`, ...) have no root user to sign in as.
    pub fn requires_signin(&self) -> bool {
        ["ws://", "wss://", "http://", "https://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "mem://".to_string(),
            username: "root".to_string(),
            password: "root".to_string(),
            namespace: "github_dashboard".to_string(),
            database: "dashboard".to_string(),
        }
    }
}
