//! Shared types for Playerbook

mod error;

pub use error::{PlayerbookError, Result};
