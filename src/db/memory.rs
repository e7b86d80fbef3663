//! In-memory document collection
//!
//! Evaluates filters, sorts, skip/limit and projection the way MongoDB
//! does for the subset of features the query layer uses. Runs the page
//! engine without a database, in tests and in memory-only mode.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bson::{Document, RawDocumentBuf};
use futures::StreamExt;
use tokio::sync::RwLock;

use crate::query::{filter, Filter, Projection, SortDirection, SortSpec};
use crate::types::{PlayerbookError, Result};

use super::collection::{DocumentCollection, FindSpec, RawCursor};

/// Ordered in-memory collection
pub struct MemoryCollection {
    name: String,
    docs: RwLock<Vec<Document>>,
    available: AtomicBool,
    latency_ms: AtomicU64,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
            latency_ms: AtomicU64::new(0),
        }
    }

    pub async fn insert(&self, doc: Document) {
        self.docs.write().await.push(doc);
    }

    pub async fn insert_many(&self, docs: impl IntoIterator<Item = Document>) {
        self.docs.write().await.extend(docs);
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    /// Simulate the store going away; every round trip then fails
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Delay added to every round trip
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, Ordering::SeqCst);
    }

    async fn round_trip(&self) -> Result<()> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if !self.available.load(Ordering::SeqCst) {
            return Err(PlayerbookError::StoreUnavailable(format!(
                "collection '{}' is unavailable",
                self.name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count(&self, filter: &Filter) -> Result<u64> {
        self.round_trip().await?;
        let docs = self.docs.read().await;
        Ok(docs.iter().filter(|doc| filter.matches(doc)).count() as u64)
    }

    async fn find(&self, filter: &Filter, spec: &FindSpec) -> Result<RawCursor> {
        self.round_trip().await?;

        let mut matched: Vec<Document> = {
            let docs = self.docs.read().await;
            docs.iter().filter(|doc| filter.matches(doc)).cloned().collect()
        };

        if let Some(sort) = spec.sort.as_ref().filter(|sort| !sort.is_empty()) {
            // Stable sort keeps insertion order among equal keys
            matched.sort_by(|a, b| compare_by(sort, a, b));
        }

        let skip = usize::try_from(spec.skip.unwrap_or(0)).unwrap_or(usize::MAX);
        // MongoDB treats limit 0 as "no limit" and a negative limit as its magnitude
        let limit = match spec.limit {
            Some(0) | None => usize::MAX,
            Some(n) => usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX),
        };

        let results: Vec<Result<RawDocumentBuf>> = matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| match &spec.projection {
                Some(projection) => project(doc, projection),
                None => doc,
            })
            .map(|doc| RawDocumentBuf::from_document(&doc).map_err(PlayerbookError::from))
            .collect();

        Ok(futures::stream::iter(results).boxed())
    }
}

fn compare_by(sort: &SortSpec, a: &Document, b: &Document) -> std::cmp::Ordering {
    for (field, direction) in sort.keys() {
        let ordering = filter::sort_cmp(
            filter::lookup_path(a, field),
            filter::lookup_path(b, field),
        );
        let ordering = match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering.is_ne() {
            return ordering;
        }
    }
    std::cmp::Ordering::Equal
}

fn project(doc: Document, projection: &Projection) -> Document {
    doc.into_iter()
        .filter(|(key, _)| projection.keeps(key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use futures_util::TryStreamExt;

    async fn seeded() -> MemoryCollection {
        let collection = MemoryCollection::new("player_info");
        collection
            .insert_many(vec![
                doc! { "_id": 1, "player_id": "p1", "lv": 10, "bag": { "capacity": 50 } },
                doc! { "_id": 2, "player_id": "p2", "lv": 30 },
                doc! { "_id": 3, "player_id": "p3", "lv": 20 },
                doc! { "_id": 4, "player_id": "p4", "lv": 30 },
            ])
            .await;
        collection
    }

    async fn collect(cursor: RawCursor) -> Vec<Document> {
        let raws: Vec<RawDocumentBuf> = cursor.try_collect().await.unwrap();
        raws.iter()
            .map(|raw| Document::try_from(raw.as_ref()).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_count_applies_filter() {
        let collection = seeded().await;
        assert_eq!(collection.count(&Filter::new()).await.unwrap(), 4);
        assert_eq!(collection.count(&Filter::new().gte("lv", 20)).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_find_sorts_with_stable_ties() {
        let collection = seeded().await;
        let spec = FindSpec {
            sort: Some(SortSpec::new().desc("lv")),
            ..Default::default()
        };

        let docs = collect(collection.find(&Filter::new(), &spec).await.unwrap()).await;
        let ids: Vec<&str> = docs.iter().map(|d| d.get_str("player_id").unwrap()).collect();
        assert_eq!(ids, ["p2", "p4", "p3", "p1"]);
    }

    #[tokio::test]
    async fn test_find_skip_limit_and_projection() {
        let collection = seeded().await;
        let spec = FindSpec {
            skip: Some(1),
            limit: Some(2),
            sort: Some(SortSpec::new().asc("player_id")),
            projection: Some(Projection::fields(["player_id"])),
        };

        let docs = collect(collection.find(&Filter::new(), &spec).await.unwrap()).await;
        assert_eq!(docs, vec![doc! { "player_id": "p2" }, doc! { "player_id": "p3" }]);
    }

    #[tokio::test]
    async fn test_unavailable_collection_fails_round_trips() {
        let collection = seeded().await;
        collection.set_available(false);

        assert!(matches!(
            collection.count(&Filter::new()).await,
            Err(PlayerbookError::StoreUnavailable(_))
        ));
        assert!(collection
            .find(&Filter::new(), &FindSpec::default())
            .await
            .is_err());
    }
}
