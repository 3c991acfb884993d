//! Storage Gateway: flat, username-partitioned document collections.
//!
//! The gateway performs no validation or transformation; it moves records in
//! and out of a [`DocumentStore`] and scopes every call by username.

mod memory;
mod surreal;

pub use memory::MemoryStore;
pub use surreal::SurrealStore;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{DashboardError, Result};
use crate::models::{Commit, Event, LanguageAggregate, Record, Repository, TopicSet, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Repos,
    Commits,
    Languages,
    Activity,
    Topics,
}

impl Collection {
    /// Deletion order used by a refresh.
    pub const ALL: [Collection; 6] = [
        Collection::Users,
        Collection::Repos,
        Collection::Commits,
        Collection::Languages,
        Collection::Activity,
        Collection::Topics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Repos => "repos",
            Collection::Commits => "commits",
            Collection::Languages => "languages",
            Collection::Activity => "activity",
            Collection::Topics => "topics",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality filter, always scoped to one username.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    username: String,
    fields: Vec<(&'static str, Value)>,
}

impl Filter {
    pub fn username(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            fields: Vec::new(),
        }
    }

    pub fn eq(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((field, value.into()));
        self
    }

    pub fn username_value(&self) -> &str {
        &self.username
    }

    pub fn fields(&self) -> &[(&'static str, Value)] {
        &self.fields
    }

    /// Whether a stored document satisfies every clause.
    pub fn matches(&self, document: &Value) -> bool {
        document.get("username").and_then(Value::as_str) == Some(self.username.as_str())
            && self
                .fields
                .iter()
                .all(|(field, expected)| document.get(*field).unwrap_or(&Value::Null) == expected)
    }
}

/// Document store contract consumed by the gateway.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_many(&self, collection: Collection, documents: Vec<Value>) -> Result<usize>;

    /// Matching documents in insertion order.
    async fn find_many(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>>;

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Value>>;

    async fn delete_many(&self, collection: Collection, filter: &Filter) -> Result<u64>;
}

/// Typed access to the six entity collections.
#[derive(Clone)]
pub struct StorageGateway {
    store: Arc<dyn DocumentStore>,
}

impl StorageGateway {
    pub fn new(store: impl DocumentStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub async fn insert_many<R: Record>(&self, records: &[R]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let documents = records
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let inserted = self.store.insert_many(R::COLLECTION, documents).await?;
        debug!(collection = %R::COLLECTION, inserted, "Inserted records");
        Ok(inserted)
    }

    pub async fn find_many<R: Record>(&self, filter: &Filter) -> Result<Vec<R>> {
        self.store
            .find_many(R::COLLECTION, filter)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(DashboardError::from))
            .collect()
    }

    pub async fn find_one<R: Record>(&self, filter: &Filter) -> Result<Option<R>> {
        match self.store.find_one(R::COLLECTION, filter).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn delete_many<R: Record>(&self, filter: &Filter) -> Result<u64> {
        self.store.delete_many(R::COLLECTION, filter).await
    }

    pub async fn user(&self, username: &str) -> Result<Option<User>> {
        self.find_one(&Filter::username(username)).await
    }

    pub async fn user_exists(&self, username: &str) -> Result<bool> {
        Ok(self.user(username).await?.is_some())
    }

    pub async fn repos(&self, username: &str) -> Result<Vec<Repository>> {
        self.find_many(&Filter::username(username)).await
    }

    pub async fn commits(&self, username: &str) -> Result<Vec<Commit>> {
        self.find_many(&Filter::username(username)).await
    }

    pub async fn events(&self, username: &str) -> Result<Vec<Event>> {
        self.find_many(&Filter::username(username)).await
    }

    pub async fn topics(&self, username: &str) -> Result<Vec<TopicSet>> {
        self.find_many(&Filter::username(username)).await
    }

    pub async fn languages(&self, username: &str) -> Result<Vec<LanguageAggregate>> {
        self.find_many(&Filter::username(username)).await
    }

    /// Delete every collection's records for `username`.
    ///
    /// Deletes run one after another; a failure leaves earlier collections
    /// already cleared.
    pub async fn clear_user(&self, username: &str) -> Result<u64> {
        let filter = Filter::username(username);
        let mut removed = 0;
        for collection in Collection::ALL {
            removed += self.store.delete_many(collection, &filter).await?;
        }
        info!(username, removed, "Cleared stored data");
        Ok(removed)
    }
}
