//! Configuration loading and management

use anyhow::{Context, Result, bail};
use hn_drip_adapters::FeedFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub render: RenderSettings,

    #[serde(default)]
    pub bluesky: BlueskyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_base_url")]
    pub base_url: String,

    #[serde(default = "default_feed_name")]
    pub feed: String,

    #[serde(default)]
    pub format: FeedFormat,

    #[serde(default = "default_min_score")]
    pub min_score: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    #[serde(default = "default_discussion_label")]
    pub discussion_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueskyConfig {
    #[serde(default = "default_bluesky_service_url")]
    pub service_url: String,

    #[serde(default = "default_bluesky_identifier_env")]
    pub identifier_env: String,

    #[serde(default = "default_bluesky_password_env")]
    pub password_env: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_state_path() -> PathBuf {
    PathBuf::from("./state.json")
}

fn default_feed_base_url() -> String {
    "https://hnrss.org".to_string()
}

fn default_feed_name() -> String {
    "newest".to_string()
}

fn default_min_score() -> u32 {
    100
}

fn default_timeout() -> u64 {
    30
}

fn default_max_age_hours() -> u32 {
    48
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_chars() -> usize {
    300
}

fn default_discussion_label() -> String {
    "HN discussion".to_string()
}

fn default_bluesky_service_url() -> String {
    "https://bsky.social".to_string()
}

fn default_bluesky_identifier_env() -> String {
    "BSKY_IDENTIFIER".to_string()
}

fn default_bluesky_password_env() -> String {
    "BSKY_APP_PASSWORD".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
            dry_run: false,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_feed_base_url(),
            feed: default_feed_name(),
            format: FeedFormat::default(),
            min_score: default_min_score(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_age_hours: default_max_age_hours(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            discussion_label: default_discussion_label(),
        }
    }
}

impl Default for BlueskyConfig {
    fn default() -> Self {
        Self {
            service_url: default_bluesky_service_url(),
            identifier_env: default_bluesky_identifier_env(),
            password_env: default_bluesky_password_env(),
            timeout_secs: default_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("HN_DRIP")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values no run could work with
    pub fn validate(&self) -> Result<()> {
        if self.render.discussion_label.trim().is_empty() {
            bail!("render.discussion_label must not be empty");
        }

        let label_chars = self.render.discussion_label.chars().count();

        // Room for the label, its separator and at least a one-character title
        let min_chars = label_chars + 3;
        if self.render.max_chars < min_chars {
            bail!(
                "render.max_chars = {} is too small for the discussion label (need at least {})",
                self.render.max_chars,
                min_chars
            );
        }

        Ok(())
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# hn-drip configuration

[general]
state_path = "./state.json"
dry_run = false

[feed]
base_url = "https://hnrss.org"
feed = "newest"
format = "rss"  # rss, json
min_score = 100
timeout_secs = 30

[selection]
# Stories older than this are skipped, never posted
max_age_hours = 48

[retry]
# Fetch and publish are attempted 3 times; the delay doubles after each failure
base_delay_ms = 1000

[render]
max_chars = 300
discussion_label = "HN discussion"

[bluesky]
service_url = "https://bsky.social"
identifier_env = "BSKY_IDENTIFIER"
password_env = "BSKY_APP_PASSWORD"
timeout_secs = 30
"#
        .to_string()
    }
}
