//! Playerbook - paged read model over the game's player documents
//!
//! Playerbook reads the per-player aggregate documents the game servers
//! keep in MongoDB and serves them to admin tooling in pages, with the
//! players' online / ban flags joined on.
//!
//! ## Components
//!
//! - **Query**: generic count + find paging with sort, projection and a
//!   caller-supplied decode target per document
//! - **Schemas**: the player aggregate, one independently versioned
//!   sub-document per gameplay section
//! - **Status**: batched online / login-ban / chat-ban lookup per page
//! - **Directory**: the player list, single-player and per-section reads

pub mod config;
pub mod db;
pub mod directory;
pub mod query;
pub mod status;
pub mod types;

pub use config::Args;
pub use directory::{PlayerDirectory, PlayerSearch, PlayerWithStatus};
pub use types::{PlayerbookError, Result};
