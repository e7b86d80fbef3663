//! In-process status flags
//!
//! Used when no external flag store is configured, and in tests. An
//! empty source reports every player with all flags off.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::types::Result;

use super::{StatusFlags, StatusSource};

#[derive(Debug, Default)]
pub struct MemoryStatusSource {
    flags: DashMap<String, StatusFlags>,
}

impl MemoryStatusSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, player_id: impl Into<String>, flags: StatusFlags) {
        let player_id = player_id.into();
        if flags == StatusFlags::default() {
            self.flags.remove(&player_id);
        } else {
            self.flags.insert(player_id, flags);
        }
    }

    pub fn set_online(&self, player_id: &str, online: bool) {
        self.update(player_id, |flags| flags.online = online);
    }

    pub fn set_ban_login(&self, player_id: &str, banned: bool) {
        self.update(player_id, |flags| flags.ban_login = banned);
    }

    pub fn set_ban_chat(&self, player_id: &str, banned: bool) {
        self.update(player_id, |flags| flags.ban_chat = banned);
    }

    /// Number of players with at least one flag set
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    fn update(&self, player_id: &str, apply: impl FnOnce(&mut StatusFlags)) {
        let mut flags = self
            .flags
            .get(player_id)
            .map(|entry| *entry)
            .unwrap_or_default();
        apply(&mut flags);
        self.set(player_id, flags);
    }
}

#[async_trait]
impl StatusSource for MemoryStatusSource {
    async fn lookup(&self, ids: &[String]) -> Result<HashMap<String, StatusFlags>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.flags.get(id).map(|entry| (id.clone(), *entry)))
            .collect())
    }
}
