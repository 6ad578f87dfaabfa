//! JSON Feed 1.1 parsing for hnrss feeds

use hn_drip_domain::{Item, SourceError};
use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::{discussion_url, non_empty, points_from_text, story_id_from_url};

#[derive(Debug, Deserialize)]
struct JsonFeed {
    #[serde(default)]
    items: Vec<JsonFeedItem>,
}

#[derive(Debug, Deserialize)]
struct JsonFeedItem {
    id: Option<Value>,
    title: Option<String>,
    url: Option<String>,
    external_url: Option<String>,
    date_published: Option<String>,
    content_html: Option<String>,
    content_text: Option<String>,
}

pub(super) fn parse(body: &str) -> Result<Vec<Item>, SourceError> {
    let feed: JsonFeed =
        serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

    let items = feed
        .items
        .into_iter()
        .filter_map(|raw| {
            let title = raw.title.clone();
            match into_item(raw) {
                Ok(item) => Some(item),
                Err(reason) => {
                    tracing::debug!(reason = reason, title = ?title, "Skipping malformed feed item");
                    None
                }
            }
        })
        .collect();

    Ok(items)
}

fn into_item(raw: JsonFeedItem) -> Result<Item, &'static str> {
    let url = non_empty(raw.url);
    let id = raw
        .id
        .as_ref()
        .and_then(id_from_value)
        .or_else(|| url.as_deref().and_then(story_id_from_url))
        .ok_or("missing story id")?;

    let title = non_empty(raw.title).ok_or("missing title")?;

    let discussion = match url.as_deref() {
        Some(u) if story_id_from_url(u) == Some(id) => u.to_string(),
        _ => discussion_url(id),
    };
    let target_url = non_empty(raw.external_url)
        .or(url)
        .ok_or("missing url")?;

    let date = non_empty(raw.date_published).ok_or("missing date_published")?;
    let published_at =
        OffsetDateTime::parse(&date, &Rfc3339).map_err(|_| "unparseable date_published")?;

    let score = raw
        .content_html
        .as_deref()
        .and_then(points_from_text)
        .or_else(|| raw.content_text.as_deref().and_then(points_from_text));

    Ok(Item {
        id,
        title,
        target_url,
        discussion_url: discussion,
        published_at,
        score,
    })
}

fn id_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok().or_else(|| story_id_from_url(s)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_json(value: Value) -> Vec<Item> {
        parse(&value.to_string()).unwrap()
    }

    #[test]
    fn test_parse_structured_item() {
        let items = parse_json(json!({
            "version": "https://jsonfeed.org/version/1.1",
            "title": "Hacker News: Newest",
            "items": [{
                "id": "39000001",
                "title": "Show HN: A tiny database",
                "content_html": "<p>Points: 150</p><p># Comments: 3</p>",
                "url": "https://news.ycombinator.com/item?id=39000001",
                "external_url": "https://example.com/db",
                "date_published": "2024-01-15T12:00:00Z",
                "author": { "name": "someone" }
            }]
        }));

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.id, 39000001);
        assert_eq!(item.target_url, "https://example.com/db");
        assert_eq!(
            item.discussion_url,
            "https://news.ycombinator.com/item?id=39000001"
        );
        assert_eq!(item.score, Some(150));
        assert_eq!(item.published_at.unix_timestamp(), 1_705_320_000);
    }

    #[test]
    fn test_parse_id_variants() {
        let items = parse_json(json!({
            "items": [
                {
                    "id": 42,
                    "title": "Numeric id",
                    "url": "https://example.com/a",
                    "date_published": "2024-01-15T12:00:00Z"
                },
                {
                    "id": "https://news.ycombinator.com/item?id=43",
                    "title": "URL id",
                    "url": "https://example.com/b",
                    "date_published": "2024-01-15T12:00:00+02:00"
                }
            ]
        }));

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 42);
        assert_eq!(items[1].id, 43);
        // No discussion URL in the feed: built from the id
        assert_eq!(
            items[0].discussion_url,
            "https://news.ycombinator.com/item?id=42"
        );
        assert_eq!(items[0].target_url, "https://example.com/a");
        assert_eq!(items[0].score, None);
    }

    #[test]
    fn test_parse_self_post_targets_discussion() {
        let items = parse_json(json!({
            "items": [{
                "id": "44",
                "title": "Ask HN: Favorite crates?",
                "url": "https://news.ycombinator.com/item?id=44",
                "date_published": "2024-01-15T12:00:00Z"
            }]
        }));

        assert_eq!(items[0].target_url, items[0].discussion_url);
    }

    #[test]
    fn test_parse_skips_malformed_items() {
        let items = parse_json(json!({
            "items": [
                { "id": "1", "url": "https://example.com", "date_published": "2024-01-15T12:00:00Z" },
                { "id": "2", "title": "No date", "url": "https://example.com" },
                { "title": "No id", "url": "https://example.com", "date_published": "2024-01-15T12:00:00Z" },
                { "id": "3", "title": "Fine", "url": "https://example.com", "date_published": "2024-01-15T12:00:00Z" }
            ]
        }));

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 3);
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(matches!(parse("not json"), Err(SourceError::Parse(_))));
    }
}
