//! Document store adapter contract
//!
//! The query layer only needs three things from a store: an exact count,
//! a find with skip/limit/sort/projection, and a cursor to iterate. Both
//! the MongoDB adapter and the in-memory collection implement this trait.

use async_trait::async_trait;
use bson::RawDocumentBuf;
use futures::stream::BoxStream;

use crate::query::{Filter, Projection, SortSpec};
use crate::types::Result;

/// Cursor over raw documents, in store order
pub type RawCursor = BoxStream<'static, Result<RawDocumentBuf>>;

/// Options for a single find round trip
#[derive(Debug, Clone, Default)]
pub struct FindSpec {
    pub skip: Option<u64>,
    pub limit: Option<i64>,
    pub sort: Option<SortSpec>,
    pub projection: Option<Projection>,
}

/// Handle to one named document collection
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Collection name, for logs and errors
    fn name(&self) -> &str;

    /// Exact count of documents matching `filter`
    async fn count(&self, filter: &Filter) -> Result<u64>;

    /// Start a find and return its cursor
    async fn find(&self, filter: &Filter, spec: &FindSpec) -> Result<RawCursor>;
}
