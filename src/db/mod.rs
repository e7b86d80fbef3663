//! Database layer for Playerbook
//!
//! A small adapter contract over a document store, with a MongoDB
//! implementation and an in-memory one, plus the document schemas.

pub mod collection;
pub mod memory;
pub mod mongo;
pub mod schemas;

pub use collection::{DocumentCollection, FindSpec, RawCursor};
pub use memory::MemoryCollection;
pub use mongo::{IntoIndexes, MongoClient, MongoCollection};
pub use schemas::{PlayerInfo, PlayerSummary, Section, SectionKey, StatusDoc};
