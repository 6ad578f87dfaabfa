//! JSON file cursor store

use async_trait::async_trait;
use hn_drip_domain::{Cursor, CursorError, CursorStore};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// On-disk shape: `{"lastStoryId": 123}`
#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    #[serde(rename = "lastStoryId")]
    last_story_id: u64,
}

/// Cursor store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonCursorStore {
    path: PathBuf,
}

impl JsonCursorStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Strict read: `Ok(None)` when the file does not exist, an error when it
    /// exists but cannot be read or parsed.
    pub async fn read(&self) -> Result<Option<Cursor>, CursorError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CursorError::Io(e)),
        };

        let state: StateFile = serde_json::from_slice(&bytes)
            .map_err(|e| CursorError::Serialization(e.to_string()))?;

        Ok(Some(Cursor::new(state.last_story_id)))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CursorStore for JsonCursorStore {
    async fn load(&self) -> Cursor {
        match self.read().await {
            Ok(Some(cursor)) => cursor,
            Ok(None) => {
                tracing::info!(path = %self.path.display(), "No state file, starting from scratch");
                Cursor::default()
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Unreadable state file, starting from scratch"
                );
                Cursor::default()
            }
        }
    }

    async fn save(&self, cursor: Cursor) -> Result<(), CursorError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let state = StateFile {
            last_story_id: cursor.last_id,
        };
        let json =
            serde_json::to_vec(&state).map_err(|e| CursorError::Serialization(e.to_string()))?;

        // Rename over the old file so readers never see a partial write.
        let temp_path = self.temp_path();
        fs::write(&temp_path, &json).await?;
        fs::rename(&temp_path, &self.path).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_loads_zero() {
        let dir = TempDir::new().expect("temp dir");
        let store = JsonCursorStore::new(dir.path().join("state.json"));

        assert_eq!(store.load().await, Cursor::default());
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_zero() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("state.json");
        let store = JsonCursorStore::new(&path);

        for contents in ["not json", "{}", "{\"lastStoryId\": -4}", "{\"lastStoryId\": \"7\"}"] {
            std::fs::write(&path, contents).expect("write state");
            assert_eq!(store.load().await, Cursor::default(), "{}", contents);
            assert!(store.read().await.is_err());
        }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nested").join("state.json");
        let store = JsonCursorStore::new(&path);

        store.save(Cursor::new(39000001)).await.unwrap();

        assert_eq!(store.load().await, Cursor::new(39000001));
        let raw = std::fs::read_to_string(&path).expect("read state");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(value, serde_json::json!({ "lastStoryId": 39000001 }));
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_reads_state_written_elsewhere() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{\n  \"lastStoryId\": 500\n}\n").expect("write state");

        let store = JsonCursorStore::new(&path);

        assert_eq!(store.load().await, Cursor::new(500));
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_value() {
        let dir = TempDir::new().expect("temp dir");
        let store = JsonCursorStore::new(dir.path().join("state.json"));

        store.save(Cursor::new(10)).await.unwrap();
        store.save(Cursor::new(20)).await.unwrap();

        assert_eq!(store.load().await, Cursor::new(20));
    }
}
