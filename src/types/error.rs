//! Error types for Playerbook
//!
//! Every failure leaves the core as one of these kinds, unmodified.
//! Translating a kind into an HTTP status or a user message belongs to
//! whatever layer serves the results.

/// Main error type for Playerbook operations
#[derive(Debug, thiserror::Error)]
pub enum PlayerbookError {
    /// Malformed request, e.g. a page number or page size below 1
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport, connection, timeout or cancellation failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Stored document shape does not match the decode target
    #[error("Decode error: {0}")]
    Decode(String),

    /// Single-entity lookup found nothing
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlayerbookError {
    /// Whether a caller-side retry could plausibly succeed.
    ///
    /// The core never retries on its own.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<mongodb::error::Error> for PlayerbookError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

impl From<bson::de::Error> for PlayerbookError {
    fn from(err: bson::de::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<bson::raw::Error> for PlayerbookError {
    fn from(err: bson::raw::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for PlayerbookError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::StoreUnavailable("deadline exceeded".to_string())
    }
}

/// Result type alias for Playerbook operations
pub type Result<T> = std::result::Result<T, PlayerbookError>;
