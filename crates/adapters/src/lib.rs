//! hn-drip adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `hnrss`: Hacker News feed source (RSS and JSON Feed)
//! - `bluesky`: Bluesky publisher with link facets
//! - `cursor_file`: JSON file cursor store
//! - `outbox`: JSONL outbox publisher for require-approval mode

pub mod bluesky;
pub mod cursor_file;
pub mod hnrss;
pub mod outbox;

pub use bluesky::BlueskyPublisher;
pub use cursor_file::JsonCursorStore;
pub use hnrss::{FeedFormat, HnFeedSource};
pub use outbox::OutboxPublisher;
