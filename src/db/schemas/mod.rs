//! Database schemas for Playerbook
//!
//! Read-side shapes of the documents this crate queries: the per-player
//! aggregate with its sections, and the ephemeral status records.

mod player;
pub mod sections;
mod status;
mod version;

pub use player::{PlayerInfo, PlayerSummary, SectionOf, PLAYER_COLLECTION, PLAYER_SUMMARY_FIELDS};
pub use sections::{Section, SectionKey};
pub use status::{StatusDoc, STATUS_COLLECTION};
pub use version::{SchemaVersion, CURRENT_SCHEMA_VERSION, SCHEMA_VERSION_FIELD};
