//! Player status document schema
//!
//! Short-lived flags written by the game servers: presence heartbeats and
//! timed bans. A record disappears once its `expire_at` passes, and a
//! missing record means every flag is off.

use std::time::Duration;

use bson::{doc, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::serde_decode_target;

/// Collection name for status flags
pub const STATUS_COLLECTION: &str = "player_status";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct StatusDoc {
    pub player_id: String,
    pub online: bool,
    pub ban_login: bool,
    pub ban_chat: bool,
    /// When the record lapses; unset means it stays until removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<DateTime>,
}

serde_decode_target!(StatusDoc);

impl IntoIndexes for StatusDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "player_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("player_id_unique".to_string())
                        .build(),
                ),
            ),
            // TTL: MongoDB removes the record once expire_at is reached
            (
                doc! { "expire_at": 1 },
                Some(
                    IndexOptions::builder()
                        .expire_after(Duration::from_secs(0))
                        .name("expire_at_ttl".to_string())
                        .build(),
                ),
            ),
        ]
    }
}
