//! Domain models and value objects

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A story fetched from the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Upstream story ID (the only reliable cross-run ordering key)
    pub id: u64,
    /// Story title
    pub title: String,
    /// URL the story points at
    pub target_url: String,
    /// URL of the discussion thread
    pub discussion_url: String,
    /// When the story was published
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    /// Upstream score, if the feed exposes it. Not used for selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

/// Persisted high-water mark: every ID at or below `last_id` is processed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cursor {
    pub last_id: u64,
}

impl Cursor {
    pub fn new(last_id: u64) -> Self {
        Self { last_id }
    }
}

/// Decision produced by the selector for a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Nothing new; leave state untouched
    NoOp,
    /// Only stale items are new; move the cursor past them without posting
    AdvanceOnly { new_last_id: u64 },
    /// Post this item, then move the cursor to it
    PostAndAdvance { item: Item, new_last_id: u64 },
}

impl Selection {
    /// Cursor value to persist, if this decision advances it
    pub fn new_last_id(&self) -> Option<u64> {
        match self {
            Selection::NoOp => None,
            Selection::AdvanceOnly { new_last_id }
            | Selection::PostAndAdvance { new_last_id, .. } => Some(*new_last_id),
        }
    }
}

/// A link annotation over a byte range of the post text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkFacet {
    /// Inclusive start offset into the UTF-8 text
    pub byte_start: usize,
    /// Exclusive end offset into the UTF-8 text
    pub byte_end: usize,
    /// Link target
    pub uri: String,
}

/// Rendered content ready for publishing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPost {
    /// Story this post was rendered from
    pub item_id: u64,
    /// The text content
    pub text: String,
    /// Link annotations into `text`
    pub links: Vec<LinkFacet>,
}

impl RenderedPost {
    /// Substring covered by a facet
    pub fn facet_text(&self, facet: &LinkFacet) -> Option<&str> {
        self.text.get(facet.byte_start..facet.byte_end)
    }
}

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No new stories
    Idle,
    /// Only stale stories were new; the cursor moved past them
    BacklogSkipped { last_id: u64 },
    /// A story was published and the cursor advanced
    Posted { item_id: u64, post_id: String },
    /// Dry run: a story would have been published
    DryRun { item_id: u64, text: String },
}
