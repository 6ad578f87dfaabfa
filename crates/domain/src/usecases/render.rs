//! Rendering use case - transforms a story into post text with link facets

use crate::model::{Item, LinkFacet, RenderedPost};

const ELLIPSIS: char = '…';

/// Title characters kept ahead of an overlong URL
const TITLE_RESERVE: usize = 80;

/// Configuration for the renderer
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Maximum characters per post
    pub max_chars: usize,
    /// Text of the link pointing at the discussion thread
    pub discussion_label: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_chars: 300,
            discussion_label: "HN discussion".to_string(),
        }
    }
}

/// Renderer for transforming stories into posts
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a story as:
    ///
    /// ```text
    /// {title}
    ///
    /// {target_url}
    ///
    /// {discussion_label}
    /// ```
    ///
    /// The URL line is dropped when the story links to its own discussion.
    /// A URL too long to fit is displayed shortened with an ellipsis; its
    /// facet still points at the full URL. Offsets in the returned facets are
    /// UTF-8 byte offsets.
    pub fn render(&self, item: &Item) -> RenderedPost {
        let max_chars = self.config.max_chars;
        let label = truncate_chars(&self.config.discussion_label, max_chars.saturating_sub(2));
        let title = item.title.trim();

        // Characters left for the title and URL line after "\n\n{label}"
        let mut budget = max_chars.saturating_sub(2 + label.chars().count());

        let title_reserve = title.chars().count().min(TITLE_RESERVE).min(budget / 2);
        let url_max = budget.saturating_sub(2 + title_reserve);

        // No URL line when not even one character of it fits
        let target = if item.target_url != item.discussion_url && url_max > 0 {
            let shown = truncate_chars(&item.target_url, url_max);
            budget -= 2 + shown.chars().count();
            Some(shown)
        } else {
            None
        };

        let title = truncate_chars(title, budget);

        let mut text = String::with_capacity(max_chars * 2);
        let mut links = Vec::with_capacity(2);

        text.push_str(&title);

        if let Some(shown) = target {
            text.push_str("\n\n");
            links.push(push_link(&mut text, &shown, &item.target_url));
        }

        text.push_str("\n\n");
        links.push(push_link(&mut text, &label, &item.discussion_url));

        RenderedPost {
            item_id: item.id,
            text,
            links,
        }
    }
}

fn push_link(text: &mut String, label: &str, uri: &str) -> LinkFacet {
    let byte_start = text.len();
    text.push_str(label);
    LinkFacet {
        byte_start,
        byte_end: text.len(),
        uri: uri.to_string(),
    }
}

/// Truncate to at most `max` characters, marking the cut with an ellipsis
fn truncate_chars(content: &str, max: usize) -> String {
    if content.chars().count() <= max {
        return content.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut truncated: String = content.chars().take(max - 1).collect();
    truncated.truncate(truncated.trim_end().len());
    truncated.push(ELLIPSIS);
    truncated
}
