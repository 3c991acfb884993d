//! Schema boundary between GitHub's JSON payloads and the stored records.
//!
//! Every raw item goes through a typed parse that either yields a record or a
//! [`ParseError`] naming the entity and the reason. Callers decide whether a
//! failure is fatal (user profile) or just logged and skipped (list items).

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Commit, Event, Repository, TopicSet, User};
use crate::types::{GitHubCommit, GitHubEvent, GitHubRepo, GitHubTopics, GitHubUser};

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{entity}: {reason}")]
pub struct ParseError {
    pub entity: &'static str,
    pub reason: String,
}

impl ParseError {
    fn new(entity: &'static str, reason: impl Into<String>) -> Self {
        Self {
            entity,
            reason: reason.into(),
        }
    }
}

fn decode<T: DeserializeOwned>(entity: &'static str, value: Value) -> Result<T, ParseError> {
    serde_json::from_value(value).map_err(|e| ParseError::new(entity, e.to_string()))
}

/// Parse an RFC 3339 timestamp and normalize it to UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_optional_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(parse_timestamp)
}

/// Expect a JSON array, as returned by every list endpoint.
pub fn parse_list(entity: &'static str, value: Value) -> Result<Vec<Value>, ParseError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(ParseError::new(
            entity,
            format!("expected a list, got {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

pub fn parse_user(
    username: &str,
    value: Value,
    fetched_at: DateTime<Utc>,
) -> Result<User, ParseError> {
    if !value.is_object() {
        return Err(ParseError::new("user", "expected an object"));
    }
    let raw: GitHubUser = decode("user", value)?;

    Ok(User {
        username: username.to_string(),
        followers: raw.followers.unwrap_or(0),
        following: raw.following.unwrap_or(0),
        public_repos: raw.public_repos.unwrap_or(0),
        avatar: raw.avatar_url.unwrap_or_default(),
        fetched_at,
    })
}

pub fn parse_repo(username: &str, value: Value) -> Result<Repository, ParseError> {
    let raw: GitHubRepo = decode("repository", value)?;

    Ok(Repository {
        username: username.to_string(),
        repo_name: raw.name,
        stars: raw.stargazers_count.unwrap_or(0),
        forks: raw.forks_count.unwrap_or(0),
        size_kb: raw.size.unwrap_or(0),
        language: raw.language,
        created_at: parse_optional_timestamp(raw.created_at.as_deref()),
        updated_at: parse_optional_timestamp(raw.updated_at.as_deref()),
        is_fork: raw.fork.unwrap_or(false),
        is_archived: raw.archived.unwrap_or(false),
        topics: raw.topics.unwrap_or_default().into_iter().collect(),
        open_issues: raw.open_issues_count.unwrap_or(0),
    })
}

pub fn parse_event(username: &str, value: Value) -> Result<Event, ParseError> {
    let raw: GitHubEvent = decode("event", value)?;
    let event_type = raw
        .event_type
        .ok_or_else(|| ParseError::new("event", "missing type"))?;

    Ok(Event {
        username: username.to_string(),
        event_type,
        repo: raw.repo.and_then(|r| r.name),
        created_at: parse_optional_timestamp(raw.created_at.as_deref()),
    })
}

pub fn parse_commit(
    username: &str,
    repo: &str,
    value: Value,
    message_chars: usize,
) -> Result<Commit, ParseError> {
    let raw: GitHubCommit = decode("commit", value)?;
    let detail = raw.commit;

    let timestamp = detail
        .as_ref()
        .and_then(|d| d.author.as_ref())
        .and_then(|a| a.date.as_deref())
        .and_then(parse_timestamp);
    let message = detail
        .and_then(|d| d.message)
        .map(|m| truncate_chars(&m, message_chars))
        .unwrap_or_default();

    Ok(Commit {
        username: username.to_string(),
        repo: repo.to_string(),
        timestamp,
        message,
    })
}

/// `Ok(None)` when the repository has no topics; empty sets are never stored.
pub fn parse_topics(
    username: &str,
    repo: &str,
    value: Value,
) -> Result<Option<TopicSet>, ParseError> {
    let raw: GitHubTopics = decode("topics", value)?;
    let topics = raw.names.unwrap_or_default();
    if topics.is_empty() {
        return Ok(None);
    }

    Ok(Some(TopicSet {
        username: username.to_string(),
        repo: repo.to_string(),
        topics,
    }))
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
