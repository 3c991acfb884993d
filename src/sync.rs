use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::analytics::{Aggregator, View};
use crate::error::{DashboardError, Result};
use crate::github::GitHubClient;
use crate::storage::StorageGateway;

/// Records written by one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub username: String,
    pub repositories: usize,
    pub events: usize,
    pub commits: usize,
    pub topic_sets: usize,
    pub languages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The username already had a stored snapshot; nothing was fetched.
    Cached,
    Fetched(SyncReport),
}

/// Moves a username's GitHub data into storage and refreshes the language view.
///
/// Steps run one after another. A failure on the user profile aborts the run;
/// the other fetches degrade to partial data on their own. Nothing is rolled
/// back, so an aborted run can leave a partial snapshot behind.
#[derive(Clone)]
pub struct Syncer {
    client: Arc<GitHubClient>,
    gateway: StorageGateway,
}

impl Syncer {
    pub fn new(client: Arc<GitHubClient>, gateway: StorageGateway) -> Self {
        Self { client, gateway }
    }

    pub fn gateway(&self) -> &StorageGateway {
        &self.gateway
    }

    pub async fn sync_user(&self, username: &str) -> Result<SyncReport> {
        let username = checked_username(username)?;

        info!(username, "Fetching GitHub data");

        let user = self.client.fetch_user(username).await?;
        self.gateway.insert_many(&[user]).await?;

        let repos = self.client.fetch_repositories(username).await;
        let repositories = self.gateway.insert_many(&repos).await?;

        let events = self.client.fetch_events(username).await;
        let events = self.gateway.insert_many(&events).await?;

        let commits = self.client.fetch_commits(username, &repos).await;
        let commits = self.gateway.insert_many(&commits).await?;

        let topic_sets = self.client.fetch_topics(username, &repos).await;
        let topic_sets = self.gateway.insert_many(&topic_sets).await?;

        let languages = match Aggregator::new(self.gateway.clone(), username)
            .aggregate_languages()
            .await?
        {
            View::Ready(aggregates) => aggregates.len(),
            View::NoData => 0,
        };

        let report = SyncReport {
            username: username.to_string(),
            repositories,
            events,
            commits,
            topic_sets,
            languages,
        };
        info!(?report, "Sync complete");
        Ok(report)
    }

    /// Drop the stored snapshot, then fetch everything again.
    pub async fn refresh(&self, username: &str) -> Result<SyncReport> {
        let username = checked_username(username)?;
        self.gateway.clear_user(username).await?;
        self.sync_user(username).await
    }

    /// Cache-aside: reuse a stored snapshot when the user record exists.
    pub async fn load_or_fetch(&self, username: &str) -> Result<SyncOutcome> {
        let username = username.trim();
        if self.gateway.user_exists(username).await? {
            info!(username, "Loaded from storage");
            return Ok(SyncOutcome::Cached);
        }
        Ok(SyncOutcome::Fetched(self.sync_user(username).await?))
    }
}

fn checked_username(username: &str) -> Result<&str> {
    let username = username.trim();
    if username.is_empty() {
        return Err(DashboardError::Config("username must not be empty".to_string()));
    }
    Ok(username)
}
