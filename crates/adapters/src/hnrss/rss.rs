//! RSS 2.0 parsing for hnrss feeds

use hn_drip_domain::{Item, SourceError};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc2822;

use super::{non_empty, points_from_text, story_id_from_url};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    comments: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

pub(super) fn parse(xml: &str) -> Result<Vec<Item>, SourceError> {
    let rss: Rss = from_str(xml).map_err(|e| SourceError::Parse(e.to_string()))?;

    let items = rss
        .channel
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

fn into_item(raw: RssItem) -> Result<Item, &'static str> {
    let comments = non_empty(raw.comments).ok_or("missing comments link")?;
    let id = story_id_from_url(&comments).ok_or("no story id in comments link")?;
    let title = non_empty(raw.title).ok_or("missing title")?;
    let target_url = non_empty(raw.link).ok_or("missing link")?;
    let pub_date = non_empty(raw.pub_date).ok_or("missing pubDate")?;
    let published_at =
        OffsetDateTime::parse(&pub_date, &Rfc2822).map_err(|_| "unparseable pubDate")?;

    Ok(Item {
        id,
        title,
        target_url,
        discussion_url: comments,
        published_at,
        score: raw.description.as_deref().and_then(points_from_text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(items: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>Hacker News: Newest</title>
    <link>https://news.ycombinator.com/newest</link>
    <description>Hacker News RSS</description>
    <atom:link href="https://hnrss.org/newest" rel="self" type="application/rss+xml"></atom:link>
    {}
  </channel>
</rss>"#,
            items
        )
    }

    fn story(id: u64, title: &str, points: u32) -> String {
        format!(
            r#"<item>
      <title><![CDATA[{title}]]></title>
      <description><![CDATA[<p>Article URL: <a href="https://example.com/{id}">https://example.com/{id}</a></p>
<p>Comments URL: <a href="https://news.ycombinator.com/item?id={id}">https://news.ycombinator.com/item?id={id}</a></p>
<p>Points: {points}</p>
<p># Comments: 12</p>]]></description>
      <pubDate>Mon, 15 Jan 2024 12:00:00 +0000</pubDate>
      <link>https://example.com/{id}</link>
      <dc:creator>someone</dc:creator>
      <comments>https://news.ycombinator.com/item?id={id}</comments>
      <guid isPermaLink="false">https://news.ycombinator.com/item?id={id}</guid>
    </item>"#
        )
    }

    #[test]
    fn test_parse_extracts_fields() {
        let xml = feed(&format!(
            "{}{}",
            story(39000001, "Show HN: A tiny database", 150),
            story(39000002, "Café & Rust", 320)
        ));

        let items = parse(&xml).unwrap();

        assert_eq!(items.len(), 2);
        let first = &items[0];
        assert_eq!(first.id, 39000001);
        assert_eq!(first.title, "Show HN: A tiny database");
        assert_eq!(first.target_url, "https://example.com/39000001");
        assert_eq!(
            first.discussion_url,
            "https://news.ycombinator.com/item?id=39000001"
        );
        assert_eq!(first.score, Some(150));
        assert_eq!(first.published_at.unix_timestamp(), 1_705_320_000);
        assert_eq!(items[1].title, "Café & Rust");
    }

    #[test]
    fn test_parse_skips_malformed_items() {
        let missing_comments = r#"<item>
      <title>No comments link</title>
      <link>https://example.com/x</link>
      <pubDate>Mon, 15 Jan 2024 12:00:00 +0000</pubDate>
    </item>"#;
        let bad_date = r#"<item>
      <title>Bad date</title>
      <link>https://example.com/y</link>
      <pubDate>yesterday</pubDate>
      <comments>https://news.ycombinator.com/item?id=5</comments>
    </item>"#;
        let xml = feed(&format!(
            "{}{}{}",
            missing_comments,
            story(39000003, "Good one", 101),
            bad_date
        ));

        let items = parse(&xml).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 39000003);
    }

    #[test]
    fn test_parse_empty_channel() {
        let items = parse(&feed("")).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_rss() {
        let result = parse("{\"items\": []}");
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }
}
