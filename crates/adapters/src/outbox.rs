//! Outbox publisher for require-approval mode.

use async_trait::async_trait;
use hn_drip_domain::model::{LinkFacet, RenderedPost};
use hn_drip_domain::ports::{PublishError, PublishResult, Publisher};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Appends rendered posts as JSON lines instead of publishing them
#[derive(Debug, Clone)]
pub struct OutboxPublisher {
    path: PathBuf,
}

impl OutboxPublisher {
    pub async fn new(path: PathBuf) -> Result<Self, OutboxError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, entry: &OutboxEntry<'_>) -> Result<(), OutboxError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct OutboxEntry<'a> {
    id: &'a str,
    item_id: u64,
    text: &'a str,
    links: &'a [LinkFacet],
}

#[async_trait]
impl Publisher for OutboxPublisher {
    async fn publish(&self, post: &RenderedPost) -> Result<PublishResult, PublishError> {
        let id = Uuid::new_v4().to_string();
        let entry = OutboxEntry {
            id: &id,
            item_id: post.item_id,
            text: &post.text,
            links: &post.links,
        };

        self.append(&entry)
            .await
            .map_err(|error| PublishError::Api(format!("Outbox write failed: {}", error)))?;

        Ok(PublishResult { id, url: None })
    }

    fn platform(&self) -> &'static str {
        "outbox"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    fn post(item_id: u64) -> RenderedPost {
        RenderedPost {
            item_id,
            text: "Rendered content\n\nHN discussion".to_string(),
            links: vec![LinkFacet {
                byte_start: 18,
                byte_end: 31,
                uri: format!("https://news.ycombinator.com/item?id={}", item_id),
            }],
        }
    }

    #[tokio::test]
    async fn outbox_publisher_writes_jsonl_entry() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("outbox.jsonl");

        let publisher = OutboxPublisher::new(path.clone()).await.expect("outbox");

        let result = publisher.publish(&post(123)).await.expect("publish");
        assert!(!result.id.is_empty());

        let contents = tokio::fs::read_to_string(&path).await.expect("read outbox");
        let value: Value = serde_json::from_str(contents.trim()).expect("valid json");

        assert_eq!(value["id"], result.id.as_str());
        assert_eq!(value["item_id"], 123);
        assert_eq!(value["text"], "Rendered content\n\nHN discussion");
        assert_eq!(value["links"][0]["byte_start"], 18);
        assert_eq!(
            value["links"][0]["uri"],
            "https://news.ycombinator.com/item?id=123"
        );
    }

    #[tokio::test]
    async fn outbox_publisher_appends() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("review").join("outbox.jsonl");

        let publisher = OutboxPublisher::new(path.clone()).await.expect("outbox");
        publisher.publish(&post(1)).await.expect("publish");
        publisher.publish(&post(2)).await.expect("publish");

        let contents = tokio::fs::read_to_string(&path).await.expect("read outbox");
        assert_eq!(contents.lines().count(), 2);
    }
}
