use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{ClientConfig, FetchLimits};
use crate::error::{DashboardError, Result};
use crate::models::{Commit, Event, Repository, TopicSet, User};
use crate::normalize;
use crate::types::GitHubErrorBody;

const ACCEPT_V3: &str = "application/vnd.github.v3+json";
const ACCEPT_TOPICS: &str = "application/vnd.github.mercy-preview+json";

/// Unauthenticated GitHub REST client producing normalized records.
///
/// No call retries on its own. Only [`GitHubClient::fetch_user`] reports
/// upstream failures; the secondary fetches degrade to partial or empty
/// results and log why.
pub struct GitHubClient {
    client: Client,
    base_url: Url,
    limits: FetchLimits,
}

impl GitHubClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("github-dashboard/0.1.0")
            .timeout(config.timeout)
            .build()?;

        let base_url = Url::parse(&config.api_url).map_err(|e| {
            DashboardError::Config(format!("invalid API URL {}: {}", config.api_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DashboardError::Config(format!(
                "API URL {} cannot be used as a base",
                config.api_url
            )));
        }

        Ok(GitHubClient {
            client,
            base_url,
            limits: config.limits,
        })
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        url
    }

    async fn get(&self, url: Url, accept: &str) -> Result<Response> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .header("Accept", accept)
            .send()
            .await?;
        Ok(response)
    }

    /// Turn a response into its JSON body or the matching upstream error.
    async fn read_json(response: Response, subject: &str) -> Result<Value> {
        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(DashboardError::NotFound(subject.to_string())),
            StatusCode::FORBIDDEN => {
                let message = Self::error_message(response)
                    .await
                    .unwrap_or_else(|| "API rate limit exceeded".to_string());
                Err(DashboardError::RateLimited(message))
            }
            status => {
                let message = Self::error_message(response)
                    .await
                    .unwrap_or_else(|| "Unknown error".to_string());
                Err(DashboardError::Upstream {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn error_message(response: Response) -> Option<String> {
        let body: GitHubErrorBody = response.json().await.ok()?;
        body.message
    }

    /// Fetch the profile; the only call whose failure is fatal to a sync.
    pub async fn fetch_user(&self, username: &str) -> Result<User> {
        let url = self.endpoint(&["users", username], &[]);
        let response = self.get(url, ACCEPT_V3).await?;
        let body = Self::read_json(response, &format!("user {}", username)).await?;
        let user = normalize::parse_user(username, body, Utc::now())?;

        info!(username, followers = user.followers, "Fetched user");
        Ok(user)
    }

    /// Page through the repository listing until a short page or a failure.
    pub async fn fetch_repositories(&self, username: &str) -> Vec<Repository> {
        let per_page = self.limits.per_page;
        let mut repos = Vec::new();
        let mut page = 1u32;

        loop {
            let url = self.endpoint(
                &["users", username, "repos"],
                &[("per_page", per_page.to_string()), ("page", page.to_string())],
            );

            let items = match self.fetch_list(url, ACCEPT_V3, "repository").await {
                Ok(items) => items,
                Err(e) => {
                    warn!(username, page, error = %e, "Repository pagination stopped early");
                    break;
                }
            };

            let received = items.len();
            for item in items {
                match normalize::parse_repo(username, item) {
                    Ok(repo) => repos.push(repo),
                    Err(e) => warn!(username, page, error = %e, "Skipping repository"),
                }
            }

            if received < per_page as usize {
                break;
            }
            page += 1;
        }

        info!(username, count = repos.len(), "Fetched repositories");
        repos
    }

    /// Most recent public events; any failure yields an empty list.
    pub async fn fetch_events(&self, username: &str) -> Vec<Event> {
        let url = self.endpoint(
            &["users", username, "events"],
            &[("per_page", self.limits.per_page.to_string())],
        );

        let items = match self.fetch_list(url, ACCEPT_V3, "event").await {
            Ok(items) => items,
            Err(e) => {
                warn!(username, error = %e, "Could not fetch events");
                return Vec::new();
            }
        };

        let events: Vec<Event> = items
            .into_iter()
            .filter_map(|item| match normalize::parse_event(username, item) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!(username, error = %e, "Skipping event");
                    None
                }
            })
            .collect();

        info!(username, count = events.len(), "Fetched activity events");
        events
    }

    /// Recent commits for the scannable repos among the first
    /// `limits.commit_repos` entries of `repos`.
    pub async fn fetch_commits(&self, username: &str, repos: &[Repository]) -> Vec<Commit> {
        let mut commits = Vec::new();

        for repo in repos.iter().take(self.limits.commit_repos) {
            if !repo.is_scannable() {
                continue;
            }

            let url = self.endpoint(
                &["repos", username, repo.repo_name.as_str(), "commits"],
                &[("per_page", self.limits.per_page.to_string())],
            );

            let items = match self.fetch_list(url, ACCEPT_V3, "commit").await {
                Ok(items) => items,
                Err(e) => {
                    warn!(username, repo = %repo.repo_name, error = %e, "Skipping commits");
                    continue;
                }
            };

            for item in items {
                match normalize::parse_commit(
                    username,
                    &repo.repo_name,
                    item,
                    self.limits.message_chars,
                ) {
                    Ok(commit) => commits.push(commit),
                    Err(e) => {
                        warn!(username, repo = %repo.repo_name, error = %e, "Skipping commit")
                    }
                }
            }
        }

        info!(username, count = commits.len(), "Fetched commits");
        commits
    }

    /// Topic sets for the scannable repos among the first
    /// `limits.topic_repos` entries of `repos`. Repos without topics are omitted.
    pub async fn fetch_topics(&self, username: &str, repos: &[Repository]) -> Vec<TopicSet> {
        let mut topic_sets = Vec::new();

        for repo in repos.iter().take(self.limits.topic_repos) {
            if !repo.is_scannable() {
                continue;
            }

            let url = self.endpoint(&["repos", username, repo.repo_name.as_str(), "topics"], &[]);
            let parsed = match self.get(url, ACCEPT_TOPICS).await {
                Ok(response) => Self::read_json(response, &repo.repo_name)
                    .await
                    .and_then(|body| {
                        normalize::parse_topics(username, &repo.repo_name, body)
                            .map_err(DashboardError::from)
                    }),
                Err(e) => Err(e),
            };

            match parsed {
                Ok(Some(set)) => topic_sets.push(set),
                Ok(None) => {}
                Err(e) => warn!(username, repo = %repo.repo_name, error = %e, "Skipping topics"),
            }
        }

        info!(username, count = topic_sets.len(), "Fetched topics");
        topic_sets
    }

    async fn fetch_list(
        &self,
        url: Url,
        accept: &str,
        entity: &'static str,
    ) -> Result<Vec<Value>> {
        let subject = url.path().to_string();
        let response = self.get(url, accept).await?;
        let body = Self::read_json(response, &subject).await?;
        Ok(normalize::parse_list(entity, body)?)
    }
}
