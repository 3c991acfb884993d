use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::storage::Collection;

/// A normalized entity persisted in one of the per-username collections.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;
}

/// GitHub user profile, one live record per username
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
    pub avatar: String,
    pub fetched_at: DateTime<Utc>,
}

/// Repository owned by the username
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub username: String,
    pub repo_name: String,
    pub stars: u64,
    pub forks: u64,
    pub size_kb: u64,
    /// `None` when GitHub could not detect a primary language.
    pub language: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_fork: bool,
    pub is_archived: bool,
    #[serde(default)]
    pub topics: BTreeSet<String>,
    pub open_issues: u64,
}

impl Repository {
    /// Non-fork, non-archived, with a detected language.
    pub fn is_qualifying(&self) -> bool {
        !self.is_fork && !self.is_archived && self.language.is_some()
    }

    /// Eligible for the per-repo commit and topic scans.
    pub fn is_scannable(&self) -> bool {
        !self.is_fork && !self.is_archived
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub username: String,
    pub repo: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub message: String,
}

/// Public activity event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub username: String,
    pub event_type: String,
    pub repo: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSet {
    pub username: String,
    pub repo: String,
    pub topics: Vec<String>,
}

/// Materialized language distribution, regenerated on every aggregation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageAggregate {
    pub username: String,
    pub language: String,
    pub repo_count: u64,
    pub percentage: f64,
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;
}

impl Record for Repository {
    const COLLECTION: Collection = Collection::Repos;
}

impl Record for Commit {
    const COLLECTION: Collection = Collection::Commits;
}

impl Record for Event {
    const COLLECTION: Collection = Collection::Activity;
}

impl Record for TopicSet {
    const COLLECTION: Collection = Collection::Topics;
}

impl Record for LanguageAggregate {
    const COLLECTION: Collection = Collection::Languages;
}
