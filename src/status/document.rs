//! Status flags backed by a document collection
//!
//! One `$in` find over the status collection per batch. Records past
//! their `expire_at` read as absent even before the TTL monitor has
//! removed them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::DateTime;
use futures_util::TryStreamExt;

use crate::db::schemas::StatusDoc;
use crate::db::{DocumentCollection, FindSpec};
use crate::query::{DecodeTarget, Filter, Projection};
use crate::types::Result;

use super::{StatusFlags, StatusSource};

#[derive(Clone)]
pub struct DocumentStatusSource {
    collection: Arc<dyn DocumentCollection>,
}

impl DocumentStatusSource {
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl StatusSource for DocumentStatusSource {
    async fn lookup(&self, ids: &[String]) -> Result<HashMap<String, StatusFlags>> {
        let filter = Filter::new().is_in("player_id", ids.iter().cloned());
        let spec = FindSpec {
            projection: Some(Projection::fields([
                "player_id",
                "online",
                "ban_login",
                "ban_chat",
                "expire_at",
            ])),
            ..Default::default()
        };

        let mut cursor = self.collection.find(&filter, &spec).await?;
        let mut found = HashMap::with_capacity(ids.len());
        let now = DateTime::now();

        while let Some(raw) = cursor.try_next().await? {
            let mut doc = StatusDoc::default();
            doc.decode_from(&raw)?;
            if doc.expire_at.is_some_and(|expire_at| expire_at <= now) {
                continue;
            }
            found.insert(
                doc.player_id,
                StatusFlags {
                    online: doc.online,
                    ban_login: doc.ban_login,
                    ban_chat: doc.ban_chat,
                },
            );
        }

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryCollection;
    use crate::status::StatusEnricher;
    use bson::doc;

    #[tokio::test]
    async fn test_lookup_reads_flag_records() {
        let collection = Arc::new(MemoryCollection::new("player_status"));
        collection
            .insert_many(vec![
                doc! { "player_id": "p1", "online": true },
                doc! { "player_id": "p2", "ban_login": true, "ban_chat": true },
                doc! { "player_id": "p9", "online": true },
            ])
            .await;

        let enricher = StatusEnricher::new(Arc::new(DocumentStatusSource::new(collection)));
        let ids = vec!["p1".to_string(), "p2".to_string(), "p3".to_string()];
        let maps = enricher.enrich_status(&ids).await.unwrap();

        assert_eq!(maps.len(), 3);
        assert_eq!(
            maps.flags_for("p1"),
            StatusFlags {
                online: true,
                ban_login: false,
                ban_chat: false,
            }
        );
        assert_eq!(
            maps.flags_for("p2"),
            StatusFlags {
                online: false,
                ban_login: true,
                ban_chat: true,
            }
        );
        assert_eq!(maps.flags_for("p3"), StatusFlags::default());
        assert!(!maps.online.contains_key("p9"));
    }

    #[tokio::test]
    async fn test_lapsed_records_read_as_cleared() {
        let lapsed = DateTime::from_millis(1000);
        let later = DateTime::from_millis(DateTime::now().timestamp_millis() + 3_600_000);
        let collection = Arc::new(MemoryCollection::new("player_status"));
        collection
            .insert_many(vec![
                doc! { "player_id": "p1", "ban_login": true, "expire_at": lapsed },
                doc! { "player_id": "p2", "ban_chat": true, "expire_at": later },
            ])
            .await;

        let enricher = StatusEnricher::new(Arc::new(DocumentStatusSource::new(collection)));
        let maps = enricher
            .enrich_status(&["p1".to_string(), "p2".to_string()])
            .await
            .unwrap();

        assert_eq!(maps.ban_login.get("p1"), Some(&false));
        assert_eq!(maps.flags_for("p1"), StatusFlags::default());
        assert!(maps.flags_for("p2").ban_chat);
    }

    #[tokio::test]
    async fn test_unavailable_collection_is_an_error() {
        let collection = Arc::new(MemoryCollection::new("player_status"));
        collection.set_available(false);

        let source = DocumentStatusSource::new(collection);
        assert!(source.lookup(&["p1".to_string()]).await.is_err());
    }
}
