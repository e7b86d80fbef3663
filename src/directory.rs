//! Player directory
//!
//! The read operations an admin console runs against player data: the
//! paged, status-enriched player list, full single-player lookups, single
//! section reads, and every persona of one account.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::db::schemas::{PlayerInfo, PlayerSummary, Section, SectionOf};
use crate::db::DocumentCollection;
use crate::query::{
    find_one, find_with_page, Filter, PageParam, PageRequest, PageResult, Projection, SortSpec,
};
use crate::status::{StatusEnricher, StatusFlags};
use crate::types::{PlayerbookError, Result};

/// Search form of the player list. Empty strings count as "not set".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlayerSearch {
    pub page: u64,
    pub page_size: u64,
    pub user_id: Option<String>,
    pub player_id: Option<String>,
    pub unique_id: Option<String>,
    /// Case-insensitive substring of the nickname
    pub nickname: Option<String>,
    pub area_id: Option<i32>,
}

impl PlayerSearch {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page,
            page_size,
            ..Default::default()
        }
    }

    pub fn to_filter(&self) -> Filter {
        fn set(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }

        let mut filter = Filter::new();
        if let Some(user_id) = set(&self.user_id) {
            filter = filter.eq("user_id", user_id);
        }
        if let Some(player_id) = set(&self.player_id) {
            filter = filter.eq("player_id", player_id);
        }
        if let Some(unique_id) = set(&self.unique_id) {
            filter = filter.eq("unique_id", unique_id);
        }
        if let Some(nickname) = set(&self.nickname) {
            filter = filter.contains("nickname", nickname);
        }
        if let Some(area_id) = self.area_id {
            filter = filter.eq("area_id", area_id);
        }
        filter
    }
}

/// One row of the player list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerWithStatus {
    pub player_id: String,
    pub unique_id: String,
    pub user_id: String,
    pub nickname: String,
    pub lv: i32,
    pub power: i64,
    pub area_id: i32,
    pub login_time: Option<DateTime<Utc>>,
    pub register_time: Option<DateTime<Utc>>,
    pub online: bool,
    pub ban_login: bool,
    pub ban_chat: bool,
}

impl PlayerWithStatus {
    pub fn new(summary: PlayerSummary, flags: StatusFlags) -> Self {
        Self {
            player_id: summary.player_id,
            unique_id: summary.unique_id,
            user_id: summary.user_id,
            nickname: summary.nickname,
            lv: summary.lv,
            power: summary.power,
            area_id: summary.area_id,
            login_time: summary.login_time.map(|t| t.to_chrono()),
            register_time: summary.register_time.map(|t| t.to_chrono()),
            online: flags.online,
            ban_login: flags.ban_login,
            ban_chat: flags.ban_chat,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Largest page a caller may request
    pub max_page_size: u64,
    /// Deadline for each page query (count + find together)
    pub query_timeout: Option<Duration>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            max_page_size: 500,
            query_timeout: Some(Duration::from_secs(10)),
        }
    }
}

/// Read access to player documents plus their status flags
#[derive(Clone)]
pub struct PlayerDirectory {
    players: Arc<dyn DocumentCollection>,
    status: StatusEnricher,
    config: DirectoryConfig,
}

impl PlayerDirectory {
    pub fn new(
        players: Arc<dyn DocumentCollection>,
        status: StatusEnricher,
        config: DirectoryConfig,
    ) -> Self {
        info!(
            "PlayerDirectory over '{}', max page size {}",
            players.name(),
            config.max_page_size
        );
        Self {
            players,
            status,
            config,
        }
    }

    /// Default listing order: newest registrations first, ties by id so
    /// pages stay stable between calls
    pub fn default_sort() -> SortSpec {
        SortSpec::new().desc("register_time").asc("player_id")
    }

    /// One page of players matching `search`, with status flags joined
    /// on in a single batch
    pub async fn list_players(
        &self,
        search: &PlayerSearch,
    ) -> Result<PageResult<PlayerWithStatus>> {
        if search.page_size > self.config.max_page_size {
            return Err(PlayerbookError::InvalidArgument(format!(
                "page_size {} exceeds the maximum of {}",
                search.page_size, self.config.max_page_size
            )));
        }

        let request = self.summary_request(
            search.to_filter(),
            PageParam::new(search.page, search.page_size),
        );
        let page = find_with_page(self.players.as_ref(), &request, PlayerSummary::default).await?;

        let ids: Vec<String> = page.list.iter().map(|p| p.player_id.clone()).collect();
        let status = self.status.enrich_status(&ids).await?;

        debug!(page = search.page, returned = ids.len(), total = page.total, "players listed");

        Ok(page.map(|summary| {
            let flags = status.flags_for(&summary.player_id);
            PlayerWithStatus::new(summary, flags)
        }))
    }

    /// Full aggregate of one player
    pub async fn get_player(&self, player_id: &str) -> Result<PlayerInfo> {
        let filter = Filter::new().eq("player_id", player_id);
        find_one(self.players.as_ref(), &filter, None, PlayerInfo::default)
            .await?
            .ok_or_else(|| PlayerbookError::NotFound(format!("player {}", player_id)))
    }

    /// A single section of one player; the rest of the document is never
    /// fetched
    pub async fn load_section<S: Section>(&self, player_id: &str) -> Result<S> {
        let filter = Filter::new().eq("player_id", player_id);
        let projection = Projection::fields(SectionOf::<S>::projected_fields());

        find_one(
            self.players.as_ref(),
            &filter,
            Some(projection),
            SectionOf::<S>::default,
        )
        .await?
        .map(|found| found.section)
        .ok_or_else(|| PlayerbookError::NotFound(format!("player {}", player_id)))
    }

    /// Every persona owned by one account, ordered by area.
    ///
    /// An account holds at most one persona per area, so one page of the
    /// maximum size covers it.
    pub async fn players_for_account(&self, user_id: &str) -> Result<Vec<PlayerSummary>> {
        let mut request = self.summary_request(
            Filter::new().eq("user_id", user_id),
            PageParam::new(1, self.config.max_page_size),
        );
        request.options.sort = Some(SortSpec::new().asc("area_id"));

        let page = find_with_page(self.players.as_ref(), &request, PlayerSummary::default).await?;
        Ok(page.list)
    }

    fn summary_request(&self, filter: Filter, page: PageParam) -> PageRequest {
        let mut request = PageRequest::new(filter, page)
            .sort(Self::default_sort())
            .projection(Projection::fields(PlayerSummary::projected_fields()));
        request.options.timeout = self.config.query_timeout;
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_search_skips_blank_fields() {
        let search = PlayerSearch {
            page: 1,
            page_size: 20,
            user_id: Some("  ".into()),
            nickname: Some("ash".into()),
            area_id: Some(3),
            ..Default::default()
        };

        assert_eq!(
            search.to_filter().to_document(),
            doc! {
                "nickname": { "$regex": "ash", "$options": "i" },
                "area_id": { "$eq": 3 },
            }
        );
    }

    #[test]
    fn test_search_deserializes_partial_form() {
        let search: PlayerSearch =
            serde_json::from_str(r#"{"page": 2, "page_size": 50, "player_id": "1000001"}"#)
                .unwrap();
        assert_eq!(search.page, 2);
        assert_eq!(search.player_id.as_deref(), Some("1000001"));
        assert!(search.nickname.is_none());
    }

    #[test]
    fn test_row_carries_flags_and_times() {
        let summary = PlayerSummary {
            player_id: "p1".into(),
            register_time: Some(bson::DateTime::from_millis(1_700_000_000_000)),
            ..Default::default()
        };
        let row = PlayerWithStatus::new(
            summary,
            StatusFlags {
                online: true,
                ban_login: false,
                ban_chat: true,
            },
        );

        assert!(row.online && row.ban_chat && !row.ban_login);
        assert_eq!(row.register_time.unwrap().timestamp(), 1_700_000_000);
        assert!(row.login_time.is_none());
    }
}
