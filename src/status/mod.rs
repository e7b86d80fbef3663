//! Status enrichment
//!
//! Joins ephemeral per-player flags (online, login ban, chat ban) onto a
//! page of results with a single batched lookup per page, never one
//! lookup per player.
//!
//! The three-map result is the stable interface; the backing source is
//! pluggable ([`MemoryStatusSource`], [`DocumentStatusSource`]).

mod document;
mod memory;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::types::Result;

pub use document::DocumentStatusSource;
pub use memory::MemoryStatusSource;

/// Flags of one player; the default (all false) is what an absent record means
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusFlags {
    pub online: bool,
    pub ban_login: bool,
    pub ban_chat: bool,
}

/// Per-flag maps with an entry for every requested id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusMaps {
    pub online: HashMap<String, bool>,
    pub ban_login: HashMap<String, bool>,
    pub ban_chat: HashMap<String, bool>,
}

impl StatusMaps {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            online: HashMap::with_capacity(capacity),
            ban_login: HashMap::with_capacity(capacity),
            ban_chat: HashMap::with_capacity(capacity),
        }
    }

    fn insert(&mut self, id: &str, flags: StatusFlags) {
        self.online.insert(id.to_string(), flags.online);
        self.ban_login.insert(id.to_string(), flags.ban_login);
        self.ban_chat.insert(id.to_string(), flags.ban_chat);
    }

    /// Flags for one id; ids that were never requested read as all false
    pub fn flags_for(&self, id: &str) -> StatusFlags {
        StatusFlags {
            online: self.online.get(id).copied().unwrap_or_default(),
            ban_login: self.ban_login.get(id).copied().unwrap_or_default(),
            ban_chat: self.ban_chat.get(id).copied().unwrap_or_default(),
        }
    }

    pub fn len(&self) -> usize {
        self.online.len()
    }

    pub fn is_empty(&self) -> bool {
        self.online.is_empty()
    }
}

/// Backing store for status flags
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Resolve flags for `ids` in one round trip. Ids without a record
    /// may simply be left out of the returned map.
    async fn lookup(&self, ids: &[String]) -> Result<HashMap<String, StatusFlags>>;
}

/// Batch-resolves status flags for the players on one page
#[derive(Clone)]
pub struct StatusEnricher {
    source: Arc<dyn StatusSource>,
}

impl StatusEnricher {
    pub fn new(source: Arc<dyn StatusSource>) -> Self {
        Self { source }
    }

    /// Resolve flags for every id in `ids`.
    ///
    /// Each returned map has an entry for every input id; ids the store
    /// knows nothing about are `false` in all three. Empty input returns
    /// empty maps without touching the store. Store failures propagate.
    pub async fn enrich_status(&self, ids: &[String]) -> Result<StatusMaps> {
        if ids.is_empty() {
            return Ok(StatusMaps::default());
        }

        let mut seen = HashSet::with_capacity(ids.len());
        let unique: Vec<String> = ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let found = self.source.lookup(&unique).await?;

        let mut maps = StatusMaps::with_capacity(unique.len());
        for id in &unique {
            maps.insert(id, found.get(id).copied().unwrap_or_default());
        }

        debug!(
            requested = ids.len(),
            unique = unique.len(),
            flagged = found.len(),
            "status enriched"
        );
        Ok(maps)
    }
}
