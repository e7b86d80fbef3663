//! Configuration for Playerbook
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Parser, ValueEnum};
use std::time::Duration;

use crate::db::schemas::{SectionKey, PLAYER_COLLECTION, STATUS_COLLECTION};
use crate::directory::{DirectoryConfig, PlayerSearch};
use crate::types::{PlayerbookError, Result};

/// Playerbook - paged read model over the game's player documents
#[derive(Parser, Debug, Clone)]
#[command(name = "playerbook")]
#[command(about = "List and inspect player documents stored in MongoDB")]
pub struct Args {
    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "game")]
    pub mongodb_db: String,

    /// Collection holding one document per player persona
    #[arg(long, env = "PLAYER_COLLECTION", default_value = PLAYER_COLLECTION)]
    pub player_collection: String,

    /// Collection holding online / ban flags
    #[arg(long, env = "STATUS_COLLECTION", default_value = STATUS_COLLECTION)]
    pub status_collection: String,

    /// Where status flags are read from
    #[arg(long, env = "STATUS_BACKEND", value_enum, default_value_t = StatusBackend::Mongo)]
    pub status_backend: StatusBackend,

    /// Deadline for one page query (count + find) in milliseconds, 0 disables it
    #[arg(long, env = "QUERY_TIMEOUT_MS", default_value = "10000")]
    pub query_timeout_ms: u64,

    /// Largest page size a caller may ask for
    #[arg(long, env = "MAX_PAGE_SIZE", default_value = "500")]
    pub max_page_size: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    /// Create the schema-declared indexes before querying
    #[arg(long, env = "ENSURE_INDEXES", default_value = "false")]
    pub ensure_indexes: bool,

    /// What to query
    #[command(flatten)]
    pub search: SearchArgs,
}

/// Backing store for status flags
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBackend {
    /// `player_status` collection in the same database
    Mongo,
    /// In-process flags; every player reads as offline and unbanned
    Memory,
}

/// Query arguments
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Page number, starting at 1
    #[arg(long, default_value = "1")]
    pub page: u64,

    /// Items per page
    #[arg(long, default_value = "20")]
    pub page_size: u64,

    #[arg(long)]
    pub player_id: Option<String>,

    #[arg(long)]
    pub user_id: Option<String>,

    #[arg(long)]
    pub unique_id: Option<String>,

    /// Case-insensitive nickname substring
    #[arg(long)]
    pub nickname: Option<String>,

    #[arg(long)]
    pub area_id: Option<i32>,

    /// Print the full document of one player instead of a list
    #[arg(long, value_name = "PLAYER_ID", conflicts_with = "account")]
    pub show: Option<String>,

    /// With --show, print only this section (bag, equip, hero, ...)
    #[arg(long, requires = "show")]
    pub section: Option<String>,

    /// Print every persona of one account
    #[arg(long, value_name = "USER_ID")]
    pub account: Option<String>,
}

impl SearchArgs {
    pub fn to_search(&self) -> PlayerSearch {
        PlayerSearch {
            page: self.page,
            page_size: self.page_size,
            user_id: self.user_id.clone(),
            player_id: self.player_id.clone(),
            unique_id: self.unique_id.clone(),
            nickname: self.nickname.clone(),
            area_id: self.area_id,
        }
    }

    /// Parsed `--section`, if given
    pub fn section_key(&self) -> Option<SectionKey> {
        self.section.as_deref().and_then(SectionKey::parse)
    }
}

impl Args {
    /// Get the page query deadline (None when disabled)
    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_ms > 0).then(|| Duration::from_millis(self.query_timeout_ms))
    }

    pub fn directory_config(&self) -> DirectoryConfig {
        DirectoryConfig {
            max_page_size: self.max_page_size,
            query_timeout: self.query_timeout(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 {
            return Err(config_error("MAX_PAGE_SIZE must be at least 1"));
        }

        if self.player_collection.is_empty() || self.status_collection.is_empty() {
            return Err(config_error("collection names must not be empty"));
        }

        if self.search.show.is_none() && self.search.account.is_none() {
            if self.search.page == 0 || self.search.page_size == 0 {
                return Err(config_error("--page and --page-size must be at least 1"));
            }
            if self.search.page_size > self.max_page_size {
                return Err(config_error(format!(
                    "--page-size {} exceeds MAX_PAGE_SIZE {}",
                    self.search.page_size, self.max_page_size
                )));
            }
        }

        if let Some(section) = &self.search.section {
            if SectionKey::parse(section).is_none() {
                return Err(config_error(format!("unknown section '{}'", section)));
            }
        }

        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> PlayerbookError {
    PlayerbookError::Config(message.into())
}
