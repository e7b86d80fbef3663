//! MongoDB client and collection adapter
//!
//! The client is a cheap clone over the driver's connection pool, so
//! concurrent queries share it without any locking of their own.

use async_trait::async_trait;
use bson::{doc, Document, RawDocumentBuf};
use futures::StreamExt;
use mongodb::{
    options::{FindOptions, IndexOptions},
    Client, Collection, IndexModel,
};
use tracing::{debug, info};

use crate::query::Filter;
use crate::types::{PlayerbookError, Result};

use super::collection::{DocumentCollection, FindSpec, RawCursor};

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and verify the server answers a ping
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        info!("Connecting to MongoDB at {}", uri);

        // Fail fast instead of hanging on an unreachable server
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri).await.map_err(|e| {
            PlayerbookError::StoreUnavailable(format!("Failed to connect to MongoDB: {}", e))
        })?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| PlayerbookError::StoreUnavailable(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Handle to a named collection
    pub fn collection(&self, name: &str) -> MongoCollection {
        MongoCollection {
            name: name.to_string(),
            inner: self.client.database(&self.db_name).collection::<Document>(name),
        }
    }
}

/// One MongoDB collection, read as raw documents
#[derive(Debug, Clone)]
pub struct MongoCollection {
    name: String,
    inner: Collection<Document>,
}

impl MongoCollection {
    /// Create the indexes a schema declares.
    ///
    /// Only run when explicitly asked for; the query layer itself never
    /// writes to the store.
    pub async fn ensure_indexes<T: IntoIndexes>(&self) -> Result<()> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner.create_indexes(indices).await.map_err(|e| {
            PlayerbookError::StoreUnavailable(format!(
                "Failed to create indexes on '{}': {}",
                self.name, e
            ))
        })?;

        info!("Indexes ensured on '{}'", self.name);
        Ok(())
    }
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count(&self, filter: &Filter) -> Result<u64> {
        self.inner
            .count_documents(filter.to_document())
            .await
            .map_err(|e| PlayerbookError::StoreUnavailable(format!("Count failed: {}", e)))
    }

    async fn find(&self, filter: &Filter, spec: &FindSpec) -> Result<RawCursor> {
        let filter = filter.to_document();
        debug!(collection = %self.name, %filter, "find");

        let options = FindOptions::builder()
            .skip(spec.skip)
            .limit(spec.limit)
            .sort(spec.sort.as_ref().map(|sort| sort.to_document()))
            .projection(spec.projection.as_ref().map(|p| p.to_document()))
            .build();

        let cursor = self
            .inner
            .clone_with_type::<RawDocumentBuf>()
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| PlayerbookError::StoreUnavailable(format!("Find failed: {}", e)))?;

        Ok(cursor
            .map(|item| {
                item.map_err(|e| {
                    PlayerbookError::StoreUnavailable(format!("Cursor read failed: {}", e))
                })
            })
            .boxed())
    }
}

