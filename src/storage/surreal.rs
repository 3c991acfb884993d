use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use surrealdb::engine::any::{connect, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::{debug, info};

use super::{Collection, DocumentStore, Filter};
use crate::config::StoreConfig;
use crate::error::{DashboardError, Result};

/// Hidden ordering key stamped on every document so reads come back in
/// insertion order.
const SEQ_FIELD: &str = "seq";

#[derive(Debug)]
pub struct SurrealStore {
    pub db: Surreal<Any>,
    last_seq: AtomicI64,
}

impl SurrealStore {
    /// Connect to SurrealDB; `mem://` gives an embedded in-process database.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        info!("Connecting to SurrealDB at {}", config.url);

        let db = connect(config.url.as_str()).await?;

        if config.requires_signin() {
            db.signin(Root {
                username: &config.username,
                password: &config.password,
            })
            .await?;
        }

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        info!("Successfully connected to SurrealDB");
        Ok(Self {
            db,
            last_seq: AtomicI64::new(0),
        })
    }

    /// Reserve `count` consecutive sequence numbers, monotonic across calls.
    fn reserve_seq(&self, count: usize) -> i64 {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let mut current = self.last_seq.load(Ordering::SeqCst);
        loop {
            let base = now.max(current + 1);
            let last = base + count as i64 - 1;
            match self
                .last_seq
                .compare_exchange(current, last, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return base,
                Err(actual) => current = actual,
            }
        }
    }

    fn where_clause(filter: &Filter) -> String {
        let mut clause = String::from("username = $username");
        for (i, (field, _)) in filter.fields().iter().enumerate() {
            clause.push_str(&format!(" AND {} = $f{}", field, i));
        }
        clause
    }

    async fn select(
        &self,
        collection: Collection,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<Value>> {
        let mut sql = format!(
            "SELECT * OMIT id FROM {} WHERE {} ORDER BY {} ASC",
            collection,
            Self::where_clause(filter),
            SEQ_FIELD
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut query = self
            .db
            .query(sql)
            .bind(("username", filter.username_value().to_string()));
        for (i, (_, value)) in filter.fields().iter().enumerate() {
            query = query.bind((format!("f{}", i), value.clone()));
        }

        let mut result = query.await?;
        let documents: Vec<Value> = result.take(0)?;

        Ok(documents
            .into_iter()
            .map(|mut doc| {
                if let Some(map) = doc.as_object_mut() {
                    map.remove(SEQ_FIELD);
                }
                doc
            })
            .collect())
    }
}

#[async_trait]
impl DocumentStore for SurrealStore {
    async fn insert_many(&self, collection: Collection, documents: Vec<Value>) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let count = documents.len();
        let base = self.reserve_seq(count);
        let documents = documents
            .into_iter()
            .enumerate()
            .map(|(i, doc)| match doc {
                Value::Object(mut map) => {
                    map.insert(SEQ_FIELD.to_string(), Value::from(base + i as i64));
                    Ok(Value::Object(map))
                }
                _ => Err(DashboardError::Storage(format!(
                    "{} documents must be objects",
                    collection
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        let sql = format!("INSERT INTO {} $documents RETURN NONE", collection);
        self.db
            .query(sql)
            .bind(("documents", documents))
            .await?
            .check()?;

        debug!(%collection, count, "Inserted documents into SurrealDB");
        Ok(count)
    }

    async fn find_many(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>> {
        self.select(collection, filter, None).await
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Value>> {
        Ok(self.select(collection, filter, Some(1)).await?.into_iter().next())
    }

    async fn delete_many(&self, collection: Collection, filter: &Filter) -> Result<u64> {
        #[derive(Debug, Deserialize)]
        struct CountResult {
            total: u64,
        }

        let clause = Self::where_clause(filter);
        let sql = format!(
            "SELECT count() AS total FROM {table} WHERE {clause} GROUP ALL; \
             DELETE {table} WHERE {clause};",
            table = collection,
            clause = clause
        );

        let mut query = self
            .db
            .query(sql)
            .bind(("username", filter.username_value().to_string()));
        for (i, (_, value)) in filter.fields().iter().enumerate() {
            query = query.bind((format!("f{}", i), value.clone()));
        }

        let mut result = query.await?;
        let counted: Option<CountResult> = result.take(0)?;
        let _: Vec<Value> = result.take(1)?;

        Ok(counted.map(|c| c.total).unwrap_or(0))
    }
}
