//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{Cursor, Item, RenderedPost};

/// Error type for item source operations
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Feed returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Failed to parse feed: {0}")]
    Parse(String),
}

/// Port for fetching candidate stories
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Fetch candidates scoring at least `min_score`.
    ///
    /// Records the source cannot make sense of are dropped, not reported.
    async fn fetch_candidates(&self, min_score: u32) -> Result<Vec<Item>, SourceError>;
}

/// Error type for publisher operations
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Content too long: {len} > {max}")]
    ContentTooLong { len: usize, max: usize },
}

impl PublishError {
    /// Whether trying the same post again could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, PublishError::ContentTooLong { .. })
    }
}

/// Result of a successful publish operation
#[derive(Debug, Clone)]
pub struct PublishResult {
    /// Platform-specific post ID
    pub id: String,
    /// URL to the published content, if available
    pub url: Option<String>,
}

/// Port for publishing a rendered story
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish a rendered post, returns the published ID
    async fn publish(&self, post: &RenderedPost) -> Result<PublishResult, PublishError>;

    /// Get the platform name (e.g., "bluesky", "outbox")
    fn platform(&self) -> &'static str;
}

/// Error type for cursor store operations
#[derive(Debug, Error)]
pub enum CursorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for the persisted high-water mark
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Load the cursor. Missing or unreadable state yields `Cursor::default()`.
    async fn load(&self) -> Cursor;

    /// Persist a new cursor
    async fn save(&self, cursor: Cursor) -> Result<(), CursorError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
